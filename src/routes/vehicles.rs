use crate::{
    error::Result,
    models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest},
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
        .route("/", get(get_all_vehicles).post(create_vehicle))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
        .route("/user/:user_id", get(get_vehicles_by_user))
}

/// Register a vehicle
/// POST /api/vehicles
async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<Value>> {
    debug!("Registering vehicle {} by user: {}", request.plate, user.id);

    let vehicle = state.vehicle_service.create_vehicle(&user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": vehicle,
        "message": "Vehicle registered successfully"
    })))
}

/// List all vehicles
/// GET /api/vehicles
async fn get_all_vehicles(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Value>> {
    let vehicles = state.vehicle_service.get_all_vehicles().await?;

    Ok(Json(json!({
        "success": true,
        "data": vehicles
    })))
}

/// Get a vehicle
/// GET /api/vehicles/:id
async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<Json<Value>> {
    let vehicle = state.vehicle_service.get_vehicle(&vehicle_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": vehicle
    })))
}

/// Vehicles of one user
/// GET /api/vehicles/user/:user_id
async fn get_vehicles_by_user(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let vehicles = state.vehicle_service.get_vehicles_by_user(&user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": vehicles
    })))
}

/// Update a vehicle
/// PUT /api/vehicles/:id
async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(vehicle_id): Path<String>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<Value>> {
    debug!("Updating vehicle: {} by user: {}", vehicle_id, user.id);

    let vehicle = state
        .vehicle_service
        .update_vehicle(&vehicle_id, &user.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": vehicle,
        "message": "Vehicle updated successfully"
    })))
}

/// Delete a vehicle
/// DELETE /api/vehicles/:id
async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(vehicle_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting vehicle: {} by user: {}", vehicle_id, user.id);

    state.vehicle_service.delete_vehicle(&vehicle_id, &user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Vehicle deleted successfully"
    })))
}
