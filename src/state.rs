use crate::{
    config::Config,
    services::{
        database::Database,
        events::EventBus,
        gate::GateService,
        notification::NotificationService,
        parking::ParkingService,
        payment::PaymentService,
        reservation::ReservationService,
        review::ReviewService,
        spot::SpotService,
        vehicle::VehicleService,
    },
};

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 数据库连接
    pub db: Database,

    /// 实时事件总线
    pub events: EventBus,

    /// 停车场服务
    pub parking_service: ParkingService,

    /// 车位服务
    pub spot_service: SpotService,

    /// 预订服务
    pub reservation_service: ReservationService,

    /// 车辆服务
    pub vehicle_service: VehicleService,

    /// 评论服务
    pub review_service: ReviewService,

    /// 通知服务
    pub notification_service: NotificationService,

    /// 道闸服务
    pub gate_service: GateService,

    /// 支付网关服务
    pub payment_service: PaymentService,
}

impl AppState {
    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.config.is_development()
    }
}
