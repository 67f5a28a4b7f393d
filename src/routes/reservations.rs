use crate::{
    error::Result,
    models::reservation::{CreateReservationRequest, UpdateReservationRequest},
    state::AppState,
    utils::middleware::AuthUser,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
pub struct PaymentCallbackQuery {
    pub reservation_id: String,
    #[allow(dead_code)]
    pub tracking_id: Option<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_all_reservations).post(create_reservation))
        .route("/:id", get(get_reservation).put(update_reservation).delete(delete_reservation))
        .route("/:id/payment", post(create_payment_link))
        .route("/user/:user_id", get(get_reservations_by_user))
        .route("/parking/:parking_id", get(get_reservations_by_parking))
        .route("/spot/:spot_id", get(get_reservations_by_spot))
        .route("/payment/success", get(payment_success))
        .route("/payment/fail", get(payment_fail))
}

/// Book a spot
/// POST /api/reservations
///
/// Pending reservations get a payment link in the response; admin-confirmed
/// ones skip the payment step entirely.
async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateReservationRequest>,
) -> Result<Json<Value>> {
    debug!(
        "Creating reservation for spot: {} by user: {}",
        request.spot_id, user.id
    );

    let reservation = state
        .reservation_service
        .create_reservation(&user.id, request)
        .await?;

    let payment_url = if reservation.status == crate::models::reservation::ReservationStatus::Pending
    {
        match state
            .reservation_service
            .create_payment_link(&reservation.id)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                // 预订已落库，支付链接可以稍后通过 /:id/payment 重新获取
                error!("Failed to create payment link for reservation {}: {}", reservation.id, e);
                None
            }
        }
    } else {
        None
    };

    Ok(Json(json!({
        "success": true,
        "data": reservation,
        "payment_url": payment_url,
        "message": "Reservation created successfully"
    })))
}

/// List all reservations
/// GET /api/reservations
async fn get_all_reservations(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Value>> {
    let reservations = state.reservation_service.get_all_reservations().await?;

    Ok(Json(json!({
        "success": true,
        "data": reservations
    })))
}

/// Get a reservation
/// GET /api/reservations/:id
async fn get_reservation(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(reservation_id): Path<String>,
) -> Result<Json<Value>> {
    let reservation = state.reservation_service.get_reservation(&reservation_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": reservation
    })))
}

/// Update a reservation
/// PUT /api/reservations/:id
async fn update_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(reservation_id): Path<String>,
    Json(request): Json<UpdateReservationRequest>,
) -> Result<Json<Value>> {
    debug!("Updating reservation: {} by user: {}", reservation_id, user.id);

    let reservation = state
        .reservation_service
        .update_reservation(&reservation_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": reservation,
        "message": "Reservation updated successfully"
    })))
}

/// Delete a reservation
/// DELETE /api/reservations/:id
async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(reservation_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting reservation: {} by user: {}", reservation_id, user.id);

    state.reservation_service.delete_reservation(&reservation_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Reservation deleted successfully"
    })))
}

/// Fresh payment link for a pending reservation
/// POST /api/reservations/:id/payment
async fn create_payment_link(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(reservation_id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Payment link requested for reservation: {} by user: {}", reservation_id, user.id);

    let payment_url = state
        .reservation_service
        .create_payment_link(&reservation_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": { "payment_url": payment_url }
    })))
}

/// Reservations of one user
/// GET /api/reservations/user/:user_id
async fn get_reservations_by_user(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let reservations = state.reservation_service.get_reservations_by_user(&user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": reservations
    })))
}

/// Reservations of one parking lot
/// GET /api/reservations/parking/:parking_id
async fn get_reservations_by_parking(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(parking_id): Path<String>,
) -> Result<Json<Value>> {
    let reservations = state
        .reservation_service
        .get_reservations_by_parking(&parking_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": reservations
    })))
}

/// Reservations of one spot
/// GET /api/reservations/spot/:spot_id
async fn get_reservations_by_spot(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(spot_id): Path<String>,
) -> Result<Json<Value>> {
    let reservations = state.reservation_service.get_reservations_by_spot(&spot_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": reservations
    })))
}

/// 支付网关成功回调，浏览器重定向进入
/// GET /api/reservations/payment/success
async fn payment_success(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentCallbackQuery>,
) -> Result<Redirect> {
    debug!("Payment success callback for reservation: {}", query.reservation_id);

    state
        .reservation_service
        .confirm_payment(&query.reservation_id)
        .await?;

    Ok(Redirect::temporary(&state.config.payment_success_redirect))
}

/// 支付网关失败回调，预订保持 pending
/// GET /api/reservations/payment/fail
async fn payment_fail(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.config.payment_fail_redirect)
}
