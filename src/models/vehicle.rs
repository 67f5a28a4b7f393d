use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub user_id: String,
    /// 归一化后的车牌号，道闸按此唯一键查车
    pub plate: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "crate::utils::validation::validate_plate_field")]
    pub plate: String,

    #[validate(length(min = 1, max = 50))]
    pub make: String,

    #[validate(length(min = 1, max = 50))]
    pub model: String,

    #[validate(length(min = 1, max = 30))]
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 50))]
    pub make: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,

    #[validate(length(min = 1, max = 30))]
    pub color: Option<String>,
}
