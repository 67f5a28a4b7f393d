use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        parking::Parking,
        reservation::{
            CreateReservationRequest, PaymentStatus, Reservation, ReservationStatus,
            UpdateReservationRequest,
        },
        spot::ParkingSpot,
        vehicle::Vehicle,
    },
    services::{notification::NotificationService, payment::PaymentService, Database},
    utils::schedule::reminder_due_at,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;
use validator::Validate;

/// 事务中检测到重叠时抛出的标记，错误映射依赖该字符串
const OVERLAP_MARKER: &str = "RESERVATION_OVERLAP";

/// 重叠检查与写入在同一事务内执行
///
/// 判定用半开区间：existing.start < new.end AND existing.end > new.start，
/// 只有 pending/confirmed 占用车位。两个并发预订同一时间窗时
/// 只有一个能提交。
const CREATE_RESERVATION_SQL: &str = r#"
BEGIN TRANSACTION;
LET $conflict = (
    SELECT meta::id(id) AS id FROM reservation
    WHERE spot_id = $spot_id
      AND status IN ['pending', 'confirmed']
      AND start_date < <datetime> $end_date
      AND end_date > <datetime> $start_date
    LIMIT 1
);
IF array::len($conflict) > 0 THEN
    THROW "RESERVATION_OVERLAP"
END;
CREATE type::thing('reservation', $id) CONTENT $data RETURN NONE;
COMMIT TRANSACTION;
"#;

/// 改期走同一条重叠规则，但要把自己排除在冲突集之外
const RESCHEDULE_RESERVATION_SQL: &str = r#"
BEGIN TRANSACTION;
LET $conflict = (
    SELECT meta::id(id) AS id FROM reservation
    WHERE spot_id = $spot_id
      AND meta::id(id) != $reservation_id
      AND status IN ['pending', 'confirmed']
      AND start_date < <datetime> $end_date
      AND end_date > <datetime> $start_date
    LIMIT 1
);
IF array::len($conflict) > 0 THEN
    THROW "RESERVATION_OVERLAP"
END;
UPDATE type::thing('reservation', $reservation_id) MERGE $updates RETURN NONE;
COMMIT TRANSACTION;
"#;

#[derive(Clone)]
pub struct ReservationService {
    db: Arc<Database>,
    notification_service: NotificationService,
    payment_service: PaymentService,
    config: Config,
}

impl ReservationService {
    pub async fn new(
        db: Arc<Database>,
        notification_service: NotificationService,
        payment_service: PaymentService,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self {
            db,
            notification_service,
            payment_service,
            config: config.clone(),
        })
    }

    /// Book a spot for `[start_date, end_date)`.
    ///
    /// References are resolved first, then the overlap check and the insert
    /// run inside one transaction. A conflicting reservation aborts the
    /// whole statement, so nothing is written on `Conflict`.
    pub async fn create_reservation(
        &self,
        user_id: &str,
        request: CreateReservationRequest,
    ) -> Result<Reservation> {
        request.validate().map_err(AppError::ValidatorError)?;

        if request.start_date >= request.end_date {
            return Err(AppError::Validation(
                "start_date must be before end_date".to_string(),
            ));
        }

        let _: Parking = self
            .db
            .get_by_id("parking", &request.parking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parking not found".to_string()))?;

        let spot: ParkingSpot = self
            .db
            .get_by_id("parking_spot", &request.spot_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parking spot not found".to_string()))?;

        if spot.parking_id != request.parking_id {
            return Err(AppError::Validation(
                "Parking spot does not belong to this parking".to_string(),
            ));
        }

        if let Some(vehicle_id) = &request.vehicle_id {
            let _: Vehicle = self
                .db
                .get_by_id("vehicle", vehicle_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
        }

        let now = Utc::now();
        let lead = self.config.reminder_lead_minutes;
        let status = if request.confirm.unwrap_or(false) {
            ReservationStatus::Confirmed
        } else {
            ReservationStatus::Pending
        };

        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            parking_id: request.parking_id,
            spot_id: request.spot_id,
            vehicle_id: request.vehicle_id,
            start_date: request.start_date,
            end_date: request.end_date,
            total_price: request.total_price,
            status,
            checked_in_at: None,
            exit_time: None,
            additional_fee: None,
            additional_payment_status: None,
            start_reminder_at: reminder_due_at(request.start_date, lead),
            end_reminder_at: reminder_due_at(request.end_date, lead),
            start_reminder_sent: false,
            end_reminder_sent: false,
            created_at: now,
            updated_at: now,
        };

        debug!(
            "Creating reservation for spot {} between {} and {}",
            reservation.spot_id, reservation.start_date, reservation.end_date
        );

        let mut data = serde_json::to_value(&reservation)?;
        if let serde_json::Value::Object(ref mut map) = data {
            map.remove("id");
        }

        self.db
            .query_with_params(
                CREATE_RESERVATION_SQL,
                json!({
                    "id": reservation.id,
                    "spot_id": reservation.spot_id,
                    "start_date": reservation.start_date,
                    "end_date": reservation.end_date,
                    "data": data,
                }),
            )
            .await
            .map_err(map_overlap_error)?;

        let created = self.get_reservation(&reservation.id).await?;
        info!("Reservation {} created with status {:?}", created.id, created.status);

        // 通知失败不阻塞预订本身
        if let Err(e) = self.notification_service.reservation_created(&created).await {
            error!("Failed to send reservation notification: {}", e);
        }

        Ok(created)
    }

    pub async fn get_all_reservations(&self) -> Result<Vec<Reservation>> {
        self.db.select_all("reservation").await
    }

    pub async fn get_reservation(&self, reservation_id: &str) -> Result<Reservation> {
        self.db
            .get_by_id("reservation", reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))
    }

    pub async fn get_reservations_by_user(&self, user_id: &str) -> Result<Vec<Reservation>> {
        self.list_by_field("user_id", user_id).await
    }

    pub async fn get_reservations_by_parking(&self, parking_id: &str) -> Result<Vec<Reservation>> {
        self.list_by_field("parking_id", parking_id).await
    }

    pub async fn get_reservations_by_spot(&self, spot_id: &str) -> Result<Vec<Reservation>> {
        self.list_by_field("spot_id", spot_id).await
    }

    /// 更新预订；涉及改期时重新走事务内的重叠检查
    pub async fn update_reservation(
        &self,
        reservation_id: &str,
        request: UpdateReservationRequest,
    ) -> Result<Reservation> {
        request.validate().map_err(AppError::ValidatorError)?;

        let existing = self.get_reservation(reservation_id).await?;

        let start_date = request.start_date.unwrap_or(existing.start_date);
        let end_date = request.end_date.unwrap_or(existing.end_date);
        if start_date >= end_date {
            return Err(AppError::Validation(
                "start_date must be before end_date".to_string(),
            ));
        }

        let dates_changed =
            start_date != existing.start_date || end_date != existing.end_date;

        let mut updates = serde_json::Map::new();
        if let Some(status) = request.status {
            updates.insert("status".to_string(), json!(status));
        }
        if let Some(total_price) = request.total_price {
            updates.insert("total_price".to_string(), json!(total_price));
        }
        if dates_changed {
            let lead = self.config.reminder_lead_minutes;
            updates.insert("start_date".to_string(), json!(start_date));
            updates.insert("end_date".to_string(), json!(end_date));
            // 改期后提醒基于新时间重新排队
            updates.insert("start_reminder_at".to_string(), json!(reminder_due_at(start_date, lead)));
            updates.insert("end_reminder_at".to_string(), json!(reminder_due_at(end_date, lead)));
            updates.insert("start_reminder_sent".to_string(), json!(false));
            updates.insert("end_reminder_sent".to_string(), json!(false));
        }
        updates.insert("updated_at".to_string(), json!(Utc::now()));

        if dates_changed {
            self.db
                .query_with_params(
                    RESCHEDULE_RESERVATION_SQL,
                    json!({
                        "reservation_id": reservation_id,
                        "spot_id": existing.spot_id,
                        "start_date": start_date,
                        "end_date": end_date,
                        "updates": serde_json::Value::Object(updates),
                    }),
                )
                .await
                .map_err(map_overlap_error)?;
        } else {
            self.db
                .merge_by_id::<Reservation>("reservation", reservation_id, json!(updates))
                .await?;
        }

        self.get_reservation(reservation_id).await
    }

    pub async fn delete_reservation(&self, reservation_id: &str) -> Result<()> {
        let existed = self.db.delete_by_id("reservation", reservation_id).await?;
        if !existed {
            return Err(AppError::NotFound("Reservation not found".to_string()));
        }
        Ok(())
    }

    /// 为待支付的预订生成支付链接
    pub async fn create_payment_link(&self, reservation_id: &str) -> Result<String> {
        let reservation = self.get_reservation(reservation_id).await?;

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::bad_request("Reservation is not awaiting payment"));
        }

        let tracking_id = format!("order-{}", Uuid::new_v4());
        let success_link = format!(
            "{}/api/reservations/payment/success?reservation_id={}&tracking_id={}",
            self.config.public_base_url, reservation.id, tracking_id
        );
        let fail_link = format!(
            "{}/api/reservations/payment/fail?reservation_id={}&tracking_id={}",
            self.config.public_base_url, reservation.id, tracking_id
        );

        self.payment_service
            .create_payment(reservation.total_price, &tracking_id, &success_link, &fail_link)
            .await
    }

    /// 支付网关成功回调：pending -> confirmed
    pub async fn confirm_payment(&self, reservation_id: &str) -> Result<Reservation> {
        self.get_reservation(reservation_id).await?;

        self.db
            .merge_by_id(
                "reservation",
                reservation_id,
                json!({
                    "status": ReservationStatus::Confirmed,
                    "updated_at": Utc::now(),
                }),
            )
            .await?
            .ok_or_else(|| AppError::internal("Failed to confirm reservation"))
    }

    /// 超时费支付成功回调
    pub async fn confirm_additional_payment(&self, reservation_id: &str) -> Result<Reservation> {
        self.get_reservation(reservation_id).await?;

        self.db
            .merge_by_id(
                "reservation",
                reservation_id,
                json!({
                    "additional_payment_status": PaymentStatus::Confirmed,
                    "updated_at": Utc::now(),
                }),
            )
            .await?
            .ok_or_else(|| AppError::internal("Failed to confirm additional payment"))
    }

    /// Bulk-close every reservation whose end has passed.
    ///
    /// Strict `<`: a reservation ending exactly at `now` stays untouched
    /// until the next pass. Idempotent, the WHERE clause excludes rows that
    /// are already `over`. Returns the number of rows transitioned.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut response = self
            .db
            .query_with_params(
                r#"
                UPDATE reservation
                SET status = 'over', updated_at = <datetime> $now
                WHERE end_date < <datetime> $now AND status != 'over'
                "#,
                json!({ "now": now }),
            )
            .await?;

        let swept: Vec<serde_json::Value> = response.take(0)?;
        Ok(swept.len())
    }

    async fn list_by_field(&self, field: &str, value: &str) -> Result<Vec<Reservation>> {
        let sql = format!(
            "SELECT *, meta::id(id) AS id FROM reservation WHERE {} = $value ORDER BY start_date DESC",
            field
        );
        let mut response = self
            .db
            .query_with_params(&sql, json!({ "value": value }))
            .await?;
        let reservations: Vec<Reservation> = response.take(0)?;
        Ok(reservations)
    }
}

/// 事务里 THROW 出来的重叠标记翻译成 409
fn map_overlap_error(err: AppError) -> AppError {
    if let AppError::Database(ref db_err) = err {
        if db_err.to_string().contains(OVERLAP_MARKER) {
            return AppError::Conflict(
                "The parking spot is already reserved for this period".to_string(),
            );
        }
    }
    err
}
