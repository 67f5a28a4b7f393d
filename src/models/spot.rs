use crate::models::parking::Parking;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 停车场内可单独预订的一个车位
///
/// 不存储可用性标志，可用与否总是根据预订的时间重叠在读取时计算。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: String,
    pub parking_id: String,
    pub number: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateSpotRequest {
    pub parking_id: String,

    #[validate(length(min = 1, max = 20))]
    pub number: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateSpotRequest {
    #[validate(length(min = 1, max = 20))]
    pub number: Option<String>,
}

/// 车位加其所属停车场详情
#[derive(Debug, Serialize)]
pub struct SpotWithParking {
    #[serde(flatten)]
    pub spot: ParkingSpot,
    pub parking: Option<Parking>,
}

/// 某时间窗内单个车位的可用性
#[derive(Debug, Serialize)]
pub struct SpotAvailability {
    #[serde(flatten)]
    pub spot: ParkingSpot,
    pub is_available: bool,
}
