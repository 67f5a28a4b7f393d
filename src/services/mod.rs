pub mod database;
pub mod events;
pub mod gate;
pub mod notification;
pub mod parking;
pub mod payment;
pub mod reservation;
pub mod review;
pub mod spot;
pub mod vehicle;

// 重新导出常用类型
pub use database::Database;
pub use events::EventBus;
pub use gate::GateService;
pub use notification::NotificationService;
pub use parking::ParkingService;
pub use payment::PaymentService;
pub use reservation::ReservationService;
pub use review::ReviewService;
pub use spot::SpotService;
pub use vehicle::VehicleService;
