use crate::models::event::RealtimeEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// 进程内发布/订阅总线
///
/// 显式注入到需要推送事件的服务中，不依赖任何全局句柄。
/// WebSocket 路由为每个连接订阅一个接收端。
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 发布事件，发布即忘
    ///
    /// 没有任何订阅者时 send 返回错误，这不是故障，只记 debug。
    pub fn publish(&self, event: RealtimeEvent) {
        match self.tx.send(event) {
            Ok(receivers) => {
                debug!("Realtime event delivered to {} subscribers", receivers);
            }
            Err(_) => {
                debug!("Realtime event dropped: no connected subscribers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::{Notification, NotificationType};
    use chrono::Utc;

    fn sample_event() -> RealtimeEvent {
        RealtimeEvent::NewNotification(Notification {
            id: "n1".to_string(),
            user_id: "u1".to_string(),
            reservation_id: "r1".to_string(),
            notification_type: NotificationType::Creation,
            message: "created".to_string(),
            read: false,
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(sample_event());

        let received = rx.recv().await.unwrap();
        match received {
            RealtimeEvent::NewNotification(n) => assert_eq!(n.id, "n1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.publish(sample_event());
        assert_eq!(bus.subscriber_count(), 0);
    }
}
