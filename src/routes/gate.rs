use crate::{
    error::{AppError, Result},
    models::gate::PlateCheckRequest,
    state::AppState,
};
use axum::{
    extract::{Query, State},
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct GatePaymentCallbackQuery {
    pub reservation_id: String,
    #[allow(dead_code)]
    pub tracking_id: Option<String>,
}

/// 道闸侧调用方是车牌识别盒子，不携带用户令牌
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/entry", post(check_entry))
        .route("/exit", post(check_exit))
        .route("/payment/success", get(overstay_payment_success))
        .route("/payment/fail", get(overstay_payment_fail))
}

/// Entry gate decision for a recognized plate
/// POST /api/gate/entry
async fn check_entry(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlateCheckRequest>,
) -> Result<Json<Value>> {
    request.validate().map_err(AppError::ValidatorError)?;
    debug!("Entry check for plate: {}", request.plate);

    let decision = state.gate_service.check_entry(&request.plate, Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "data": decision
    })))
}

/// Exit gate decision, including overstay billing
/// POST /api/gate/exit
async fn check_exit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlateCheckRequest>,
) -> Result<Json<Value>> {
    request.validate().map_err(AppError::ValidatorError)?;
    debug!("Exit check for plate: {}", request.plate);

    let decision = state.gate_service.check_exit(&request.plate, Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "data": decision
    })))
}

/// 超时费支付成功回调
/// GET /api/gate/payment/success
async fn overstay_payment_success(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GatePaymentCallbackQuery>,
) -> Result<Redirect> {
    debug!("Overstay payment confirmed for reservation: {}", query.reservation_id);

    state
        .reservation_service
        .confirm_additional_payment(&query.reservation_id)
        .await?;

    Ok(Redirect::temporary(&state.config.payment_success_redirect))
}

/// 超时费支付失败回调
/// GET /api/gate/payment/fail
async fn overstay_payment_fail(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.config.payment_fail_redirect)
}
