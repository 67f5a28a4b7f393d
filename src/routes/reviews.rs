use crate::{
    error::Result,
    models::review::CreateReviewRequest,
    state::AppState,
    utils::middleware::AuthUser,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_review))
        .route("/parking/:parking_id", get(get_reviews_by_parking))
        .route("/:id", delete(delete_review))
}

/// Review a parking lot
/// POST /api/reviews
async fn create_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<Value>> {
    debug!("Creating review for parking: {} by user: {}", request.parking_id, user.id);

    let review = state.review_service.create_review(&user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": review,
        "message": "Review created successfully"
    })))
}

/// Reviews of one parking lot
/// GET /api/reviews/parking/:parking_id
async fn get_reviews_by_parking(
    State(state): State<Arc<AppState>>,
    Path(parking_id): Path<String>,
) -> Result<Json<Value>> {
    let reviews = state.review_service.get_reviews_by_parking(&parking_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": reviews
    })))
}

/// Delete a review
/// DELETE /api/reviews/:id
async fn delete_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(review_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting review: {} by user: {}", review_id, user.id);

    state.review_service.delete_review(&review_id, &user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Review deleted successfully"
    })))
}
