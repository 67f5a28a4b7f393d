use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parking {
    pub id: String,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub hourly_rate: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub average_rating: f64,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateParkingRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 200))]
    pub address: String,

    #[validate(range(min = 0))]
    pub capacity: i32,

    #[validate(range(min = 0.0))]
    pub hourly_rate: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateParkingRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub address: Option<String>,

    #[validate(range(min = 0))]
    pub capacity: Option<i32>,

    #[validate(range(min = 0.0))]
    pub hourly_rate: Option<f64>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// 查询某时间窗内车位可用性的请求
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub parking_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}
