use crate::{error::Result, state::AppState, utils::middleware::AuthUser};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_notifications))
        .route("/read-all", put(mark_all_read))
        .route("/:id", delete(delete_notification))
}

/// Current user's notifications, newest first
/// GET /api/notifications
async fn get_notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>> {
    let notifications = state
        .notification_service
        .get_notifications_for_user(&user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": notifications
    })))
}

/// Mark all notifications as read
/// PUT /api/notifications/read-all
async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>> {
    debug!("Marking all notifications as read for user: {}", user.id);

    let updated = state.notification_service.mark_all_read(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "updated": updated },
        "message": "All notifications marked as read"
    })))
}

/// Delete a notification
/// DELETE /api/notifications/:id
async fn delete_notification(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting notification: {} by user: {}", notification_id, user.id);

    state
        .notification_service
        .delete_notification(&notification_id, &user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Notification deleted successfully"
    })))
}
