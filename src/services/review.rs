use crate::{
    error::{AppError, Result},
    models::review::{CreateReviewRequest, Review},
    services::{parking::ParkingService, Database},
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct ReviewService {
    db: Arc<Database>,
    parking_service: ParkingService,
}

impl ReviewService {
    pub async fn new(db: Arc<Database>, parking_service: ParkingService) -> Result<Self> {
        Ok(Self { db, parking_service })
    }

    pub async fn create_review(&self, user_id: &str, request: CreateReviewRequest) -> Result<Review> {
        request.validate().map_err(AppError::ValidatorError)?;

        // 评论挂在存在的停车场上
        self.parking_service.get_parking(&request.parking_id).await?;

        let review = Review {
            id: Uuid::new_v4().to_string(),
            parking_id: request.parking_id,
            user_id: user_id.to_string(),
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        };

        debug!("Creating review for parking {} by user {}", review.parking_id, user_id);
        let data = serde_json::to_value(&review)?;
        let created: Review = self.db.create("review", &review.id, data).await?;

        self.parking_service.recompute_rating(&created.parking_id).await?;

        Ok(created)
    }

    pub async fn get_reviews_by_parking(&self, parking_id: &str) -> Result<Vec<Review>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM review WHERE parking_id = $parking_id ORDER BY created_at DESC",
                json!({ "parking_id": parking_id }),
            )
            .await?;
        let reviews: Vec<Review> = response.take(0)?;
        Ok(reviews)
    }

    pub async fn delete_review(&self, review_id: &str, user_id: &str) -> Result<()> {
        let review: Review = self
            .db
            .get_by_id("review", review_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

        if review.user_id != user_id {
            return Err(AppError::forbidden("You can only delete your own reviews"));
        }

        self.db.delete_by_id("review", review_id).await?;
        self.parking_service.recompute_rating(&review.parking_id).await?;

        Ok(())
    }
}
