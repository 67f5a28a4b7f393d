use crate::{error::AppError, state::AppState};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, sync::Arc};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

type KeyedRateLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock>;
static RATE_LIMITER: OnceCell<KeyedRateLimiter> = OnceCell::const_new();

/// JWT 载荷
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub email: Option<String>,
}

/// 已通过令牌校验的请求方
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// 提取器：处理器声明 AuthUser 参数即要求已认证，
/// 未携带有效令牌的请求得到 401
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Authentication("Missing or invalid access token".to_string()))
    }
}

/// 认证中间件
///
/// 校验 Bearer JWT 并把用户写入请求扩展。令牌缺失或无效时
/// 请求继续作为匿名请求处理，是否放行由各处理器的提取器决定。
/// 登录、注册等流程由外部认证服务负责，这里只做校验。
pub async fn auth_middleware(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next<Body>,
) -> Response {
    if let Some(auth_header) = headers.get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                match verify_jwt(token, &app_state.config.jwt_secret) {
                    Ok(claims) => {
                        debug!("Authenticated user: {}", claims.sub);
                        request.extensions_mut().insert(AuthUser {
                            id: claims.sub,
                            email: claims.email,
                        });
                    }
                    Err(e) => {
                        debug!("JWT verification failed: {}", e);
                    }
                }
            }
        }
    }

    next.run(request).await
}

fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|_| AppError::Authentication("Invalid token".to_string()))?;
    Ok(token_data.claims)
}

/// 速率限制中间件
pub async fn rate_limit_middleware(
    State(app_state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    let rate_limiter = RATE_LIMITER
        .get_or_init(|| async {
            let quota = Quota::per_minute(
                NonZeroU32::new(app_state.config.rate_limit_requests).unwrap(),
            )
            .allow_burst(NonZeroU32::new(10).unwrap());
            RateLimiter::dashmap(quota)
        })
        .await;

    let client_ip = get_client_ip(&request);

    match rate_limiter.check_key(&client_ip) {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            warn!("Rate limit exceeded for IP: {}", client_ip);
            Err(AppError::RateLimitExceeded)
        }
    }
}

/// 获取客户端 IP 地址，优先各类代理头
fn get_client_ip(request: &Request<Body>) -> String {
    let headers = request.headers();

    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(ip) = value.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            return value.to_string();
        }
    }

    "unknown".to_string()
}
