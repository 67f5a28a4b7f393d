use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub reservation_id: String,
    pub notification_type: NotificationType,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Creation,
    StartReminder,
    EndReminder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&NotificationType::Creation).unwrap(),
            "\"creation\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationType::StartReminder).unwrap(),
            "\"start_reminder\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationType::EndReminder).unwrap(),
            "\"end_reminder\""
        );
    }
}
