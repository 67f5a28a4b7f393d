use crate::models::{reservation::Reservation, vehicle::Vehicle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 道闸摄像头识别出的车牌
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PlateCheckRequest {
    #[validate(length(min = 1, max = 20))]
    pub plate: String,
}

/// 入场道闸的放行决定
#[derive(Debug, Serialize)]
pub struct EntryDecision {
    pub authorized: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,
    pub current_time: DateTime<Utc>,
}

/// 出场道闸的放行决定，含超时计费明细
#[derive(Debug, Serialize)]
pub struct ExitDecision {
    pub authorized: bool,
    pub message: String,
    pub reservation_id: String,
    pub reservation: ExitReservationDetails,
    pub overstay: OverstayDetails,
    /// 需要补缴时给出支付链接
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExitReservationDetails {
    pub start_time: String,
    pub end_time: String,
    pub current_time: String,
    pub original_price: f64,
    pub hourly_rate: f64,
    pub vehicle: ExitVehicleDetails,
}

#[derive(Debug, Serialize)]
pub struct ExitVehicleDetails {
    pub plate: String,
    pub make: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct OverstayDetails {
    pub minutes: i64,
    pub hours: i64,
    pub additional_fee: f64,
    pub needs_payment: bool,
}
