use std::sync::Arc;
use axum::{
    routing::{Router, get},
    http::{Method, HeaderValue},
    middleware,
};
use chrono::Utc;
use tower_http::{
    cors::{CorsLayer, Any},
    compression::CompressionLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing::{info, error, debug};
use tokio::time::{interval, Duration};

mod routes;
mod models;
mod services;
mod config;
mod error;
mod utils;
mod state;

use crate::{
    config::Config,
    state::AppState,
    services::{
        Database,
        EventBus,
        GateService,
        NotificationService,
        ParkingService,
        PaymentService,
        ReservationService,
        ReviewService,
        SpotService,
        VehicleService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "parkflow=debug,tower_http=debug".into())
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parkflow service...");

    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化数据库连接
    let db = match Database::new(&config).await {
        Ok(db) => {
            db.verify_connection().await?;
            info!("Database connection established successfully");
            db.init_schema().await?;
            Arc::new(db)
        }
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    };

    // 初始化所有服务
    let events = EventBus::default();
    let payment_service = PaymentService::new(&config)?;
    let parking_service = ParkingService::new(db.clone()).await?;
    let spot_service = SpotService::new(db.clone()).await?;
    let vehicle_service = VehicleService::new(db.clone()).await?;
    let review_service = ReviewService::new(db.clone(), parking_service.clone()).await?;
    let notification_service = NotificationService::new(db.clone(), events.clone()).await?;
    let reservation_service = ReservationService::new(
        db.clone(),
        notification_service.clone(),
        payment_service.clone(),
        &config,
    ).await?;
    let gate_service = GateService::new(db.clone(), payment_service.clone(), &config).await?;

    // 创建应用状态
    let app_state = Arc::new(AppState {
        config: config.clone(),
        db: (*db).clone(),
        events,
        parking_service,
        spot_service,
        reservation_service,
        vehicle_service,
        review_service,
        notification_service,
        gate_service,
        payment_service,
    });

    // 启动后台任务
    start_background_tasks(app_state.clone()).await;

    // 配置 CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(
            config.cors_allowed_origins
                .split(',')
                .map(|origin| origin.parse::<HeaderValue>().unwrap())
                .collect::<Vec<_>>(),
        );

    // 构建应用路由
    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/parkings", routes::parkings::router())
        .nest("/api/spots", routes::spots::router())
        .nest("/api/reservations", routes::reservations::router())
        .nest("/api/vehicles", routes::vehicles::router())
        .nest("/api/reviews", routes::reviews::router())
        .nest("/api/notifications", routes::notifications::router())
        .nest("/api/gate", routes::gate::router())
        .nest("/api/ws", routes::ws::router())
        .layer(middleware::from_fn_with_state(app_state.clone(), utils::middleware::auth_middleware))
        .layer(middleware::from_fn_with_state(app_state.clone(), utils::middleware::rate_limit_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // 启动主服务器
    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "Parkflow is running!"
}

async fn start_background_tasks(app_state: Arc<AppState>) {
    info!("Starting background tasks...");

    // 生命周期清扫任务：到期的预订批量置为 over
    let sweep_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(
            sweep_state.config.sweep_interval_secs
        ));

        loop {
            interval.tick().await;
            match sweep_state.reservation_service.sweep_expired(Utc::now()).await {
                Ok(swept) if swept > 0 => {
                    info!("Lifecycle sweep marked {} reservations as over", swept);
                }
                Ok(_) => {
                    debug!("Lifecycle sweep found no expired reservations");
                }
                // 失败只记录，下个周期自然重试
                Err(e) => {
                    error!("Lifecycle sweep failed: {}", e);
                }
            }
        }
    });

    // 提醒轮询任务：到期的开始/结束提醒落库并广播
    let reminder_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(
            reminder_state.config.reminder_interval_secs
        ));

        loop {
            interval.tick().await;
            let lead = reminder_state.config.reminder_lead_minutes;
            if let Err(e) = reminder_state.notification_service.run_reminder_pass(Utc::now(), lead).await {
                error!("Reminder pass failed: {}", e);
            }
        }
    });

    info!("Background tasks started successfully");
}
