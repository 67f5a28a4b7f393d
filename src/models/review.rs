use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub parking_id: String,
    pub user_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub parking_id: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    #[validate(length(min = 1, max = 1000))]
    pub comment: String,
}
