use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(websocket_handler))
}

/// WebSocket 订阅端点
/// GET /api/ws
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// 把事件总线上的实时事件转发给连接的客户端
///
/// 纯订阅侧：客户端发来的文本一律忽略，只响应关闭帧。
/// 消费跟不上导致 Lagged 时跳过丢失的事件继续，不补发。
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let mut events = state.events.subscribe();
    let (mut ws_tx, mut ws_rx) = socket.split();

    info!("WebSocket client connected ({} active)", state.events.subscriber_count());

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(e) => {
                                debug!("Failed to serialize realtime event: {}", e);
                                continue;
                            }
                        };
                        if ws_tx.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        debug!("WebSocket client lagged, {} events dropped", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("WebSocket receive error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
