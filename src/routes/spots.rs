use crate::{
    error::Result,
    models::spot::{CreateSpotRequest, UpdateSpotRequest},
    state::AppState,
    utils::middleware::AuthUser,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_all_spots).post(create_spot))
        .route("/:id", get(get_spot).put(update_spot).delete(delete_spot))
        .route("/parking/:parking_id", get(get_spots_by_parking))
}

/// Create a parking spot
/// POST /api/spots
async fn create_spot(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateSpotRequest>,
) -> Result<Json<Value>> {
    debug!(
        "Creating spot {} in parking {} by user: {}",
        request.number, request.parking_id, user.id
    );

    let spot = state.spot_service.create_spot(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": spot,
        "message": "Parking spot created successfully"
    })))
}

/// List all spots with their lot details
/// GET /api/spots
async fn get_all_spots(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let spots = state.spot_service.get_all_spots().await?;

    Ok(Json(json!({
        "success": true,
        "data": spots
    })))
}

/// Get a spot
/// GET /api/spots/:id
async fn get_spot(
    State(state): State<Arc<AppState>>,
    Path(spot_id): Path<String>,
) -> Result<Json<Value>> {
    let spot = state.spot_service.get_spot(&spot_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": spot
    })))
}

/// Spots of one parking lot
/// GET /api/spots/parking/:parking_id
async fn get_spots_by_parking(
    State(state): State<Arc<AppState>>,
    Path(parking_id): Path<String>,
) -> Result<Json<Value>> {
    let spots = state.spot_service.get_spots_by_parking(&parking_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": spots
    })))
}

/// Update a spot
/// PUT /api/spots/:id
async fn update_spot(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(spot_id): Path<String>,
    Json(request): Json<UpdateSpotRequest>,
) -> Result<Json<Value>> {
    debug!("Updating spot: {} by user: {}", spot_id, user.id);

    let spot = state.spot_service.update_spot(&spot_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": spot,
        "message": "Parking spot updated successfully"
    })))
}

/// Delete a spot
/// DELETE /api/spots/:id
async fn delete_spot(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(spot_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting spot: {} by user: {}", spot_id, user.id);

    state.spot_service.delete_spot(&spot_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Parking spot deleted successfully"
    })))
}
