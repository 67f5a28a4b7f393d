use crate::{
    error::Result,
    models::parking::{AvailabilityRequest, CreateParkingRequest, UpdateParkingRequest},
    state::AppState,
    utils::middleware::AuthUser,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_all_parkings).post(create_parking))
        .route("/available", post(find_available_spots))
        .route("/:id", get(get_parking).put(update_parking).delete(delete_parking))
}

/// Create a parking lot
/// POST /api/parkings
async fn create_parking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateParkingRequest>,
) -> Result<Json<Value>> {
    debug!("Creating parking {} by user: {}", request.name, user.id);

    let parking = state.parking_service.create_parking(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": parking,
        "message": "Parking created successfully"
    })))
}

/// List all parking lots
/// GET /api/parkings
async fn get_all_parkings(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let parkings = state.parking_service.get_all_parkings().await?;

    Ok(Json(json!({
        "success": true,
        "data": parkings
    })))
}

/// Get a parking lot
/// GET /api/parkings/:id
async fn get_parking(
    State(state): State<Arc<AppState>>,
    Path(parking_id): Path<String>,
) -> Result<Json<Value>> {
    let parking = state.parking_service.get_parking(&parking_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": parking
    })))
}

/// Update a parking lot
/// PUT /api/parkings/:id
async fn update_parking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(parking_id): Path<String>,
    Json(request): Json<UpdateParkingRequest>,
) -> Result<Json<Value>> {
    debug!("Updating parking: {} by user: {}", parking_id, user.id);

    let parking = state.parking_service.update_parking(&parking_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": parking,
        "message": "Parking updated successfully"
    })))
}

/// Delete a parking lot
/// DELETE /api/parkings/:id
async fn delete_parking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(parking_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting parking: {} by user: {}", parking_id, user.id);

    state.parking_service.delete_parking(&parking_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Parking deleted successfully"
    })))
}

/// Per-spot availability for a lot over a time window
/// POST /api/parkings/available
async fn find_available_spots(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<Value>> {
    debug!(
        "Availability request for parking {} [{} - {}]",
        request.parking_id, request.start_date, request.end_date
    );

    let spots = state
        .parking_service
        .find_available_spots(&request.parking_id, request.start_date, request.end_date)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": { "spots": spots }
    })))
}
