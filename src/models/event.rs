use crate::models::notification::Notification;
use serde::Serialize;

/// 推送给已连接客户端的实时事件
///
/// 发布即忘：没有订阅者或客户端掉线时事件直接丢弃，不重试。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    NewNotification(Notification),
    ReminderNotification(Notification),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationType;
    use chrono::Utc;

    #[test]
    fn test_event_envelope_shape() {
        let event = RealtimeEvent::NewNotification(Notification {
            id: "n1".to_string(),
            user_id: "u1".to_string(),
            reservation_id: "r1".to_string(),
            notification_type: NotificationType::Creation,
            message: "Your reservation has been created successfully".to_string(),
            read: false,
            created_at: Utc::now(),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "new_notification");
        assert_eq!(value["data"]["id"], "n1");
        assert_eq!(value["data"]["notification_type"], "creation");
    }
}
