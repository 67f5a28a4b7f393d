use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub parking_id: String,
    pub spot_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: f64,
    pub status: ReservationStatus,
    /// 入场道闸放行时写入
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    /// 离场放行时写入，写入后预订不再参与出口查询
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    /// 最近一次计算出的超时费
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_payment_status: Option<PaymentStatus>,
    // 提醒通过持久化的到期时刻由后台任务轮询触发
    pub start_reminder_at: DateTime<Utc>,
    pub end_reminder_at: DateTime<Utc>,
    pub start_reminder_sent: bool,
    pub end_reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Over,
}

impl Default for ReservationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ReservationStatus {
    /// pending 与 confirmed 参与重叠判定；over 已终结不占用车位
    pub fn blocks_spot(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub parking_id: String,
    pub spot_id: String,
    pub vehicle_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    #[validate(range(min = 0.0))]
    pub total_price: f64,

    /// 管理端直接确认，跳过支付流程
    pub confirm: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateReservationRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<ReservationStatus>,

    #[validate(range(min = 0.0))]
    pub total_price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Over).unwrap(),
            "\"over\""
        );
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let parsed: Result<ReservationStatus, _> = serde_json::from_str("\"canceled\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_blocks_spot() {
        assert!(ReservationStatus::Pending.blocks_spot());
        assert!(ReservationStatus::Confirmed.blocks_spot());
        assert!(!ReservationStatus::Over.blocks_spot());
    }
}
