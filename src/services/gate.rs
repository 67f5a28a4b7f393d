use crate::{
    config::Config,
    error::{AppError, Result},
    models::{
        gate::{
            EntryDecision, ExitDecision, ExitReservationDetails, ExitVehicleDetails,
            OverstayDetails,
        },
        parking::Parking,
        reservation::{PaymentStatus, Reservation},
        vehicle::Vehicle,
    },
    services::{payment::PaymentService, Database},
    utils::{schedule::compute_overstay, validation::normalize_plate},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 道闸服务：车牌识别之后的入场/出场放行决定
#[derive(Clone)]
pub struct GateService {
    db: Arc<Database>,
    payment_service: PaymentService,
    config: Config,
}

impl GateService {
    pub async fn new(
        db: Arc<Database>,
        payment_service: PaymentService,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self {
            db,
            payment_service,
            config: config.clone(),
        })
    }

    /// 入场检查
    ///
    /// 当前时刻落在某个 confirmed 预订的时间窗内则放行，
    /// 并记录 checked_in_at。找不到预订时正常返回拒绝，不算错误。
    pub async fn check_entry(&self, plate: &str, now: DateTime<Utc>) -> Result<EntryDecision> {
        let vehicle = self.find_vehicle(plate).await?;
        debug!("Entry check for vehicle {} ({})", vehicle.id, vehicle.plate);

        let mut response = self
            .db
            .query_with_params(
                r#"
                SELECT *, meta::id(id) AS id FROM reservation
                WHERE vehicle_id = $vehicle_id
                  AND status = 'confirmed'
                  AND start_date <= <datetime> $now
                  AND end_date >= <datetime> $now
                LIMIT 1
                "#,
                json!({ "vehicle_id": vehicle.id, "now": now }),
            )
            .await?;
        let active: Option<Reservation> = response.take::<Vec<Reservation>>(0)?.into_iter().next();

        let Some(reservation) = active else {
            return Ok(EntryDecision {
                authorized: false,
                message: "No active reservation".to_string(),
                vehicle: Some(vehicle),
                reservation: None,
                current_time: now,
            });
        };

        let checked_in: Option<Reservation> = self
            .db
            .merge_by_id(
                "reservation",
                &reservation.id,
                json!({ "checked_in_at": now, "updated_at": now }),
            )
            .await?;

        info!("Vehicle {} admitted on reservation {}", vehicle.plate, reservation.id);

        Ok(EntryDecision {
            authorized: true,
            message: "Access granted".to_string(),
            vehicle: Some(vehicle),
            reservation: checked_in.or(Some(reservation)),
            current_time: now,
        })
    }

    /// Exit check with overstay billing.
    ///
    /// Looks up the confirmed reservation without an exit time for the
    /// plate's vehicle. Overstay past `end_date` bills whole hours at the
    /// lot's rate. With nothing owed (or the fee already settled) the exit
    /// time is stamped and the gate opens; otherwise the decision carries a
    /// payment link and the vehicle stays logically inside.
    pub async fn check_exit(&self, plate: &str, now: DateTime<Utc>) -> Result<ExitDecision> {
        let vehicle = self.find_vehicle(plate).await?;

        let mut response = self
            .db
            .query_with_params(
                r#"
                SELECT *, meta::id(id) AS id FROM reservation
                WHERE vehicle_id = $vehicle_id
                  AND status = 'confirmed'
                  AND exit_time IS NONE
                LIMIT 1
                "#,
                json!({ "vehicle_id": vehicle.id }),
            )
            .await?;
        let reservation: Reservation = response
            .take::<Vec<Reservation>>(0)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::NotFound("No active reservation found for this vehicle".to_string())
            })?;

        let parking: Parking = self
            .db
            .get_by_id("parking", &reservation.parking_id)
            .await?
            .ok_or_else(|| AppError::internal("Hourly rate unavailable for this parking"))?;

        let charge = compute_overstay(reservation.end_date, now, parking.hourly_rate);
        let needs_payment = requires_payment(charge.fee, reservation.additional_payment_status);

        // 记录最新一次计算出的超时费
        if charge.fee > 0.0 && reservation.additional_fee != Some(charge.fee) {
            let _: Option<Reservation> = self
                .db
                .merge_by_id(
                    "reservation",
                    &reservation.id,
                    json!({ "additional_fee": charge.fee, "updated_at": now }),
                )
                .await?;
        }

        let payment_url = if needs_payment {
            Some(self.overstay_payment_link(&reservation.id, charge.fee).await?)
        } else {
            None
        };

        if !needs_payment {
            let _: Option<Reservation> = self
                .db
                .merge_by_id(
                    "reservation",
                    &reservation.id,
                    json!({ "exit_time": now, "updated_at": now }),
                )
                .await?;
            info!("Vehicle {} released on reservation {}", vehicle.plate, reservation.id);
        } else {
            info!(
                "Vehicle {} held at exit: {} due on reservation {}",
                vehicle.plate, charge.fee, reservation.id
            );
        }

        Ok(ExitDecision {
            authorized: !needs_payment,
            message: if needs_payment {
                "An additional fee must be settled before exit".to_string()
            } else {
                "Exit authorized".to_string()
            },
            reservation_id: reservation.id.clone(),
            reservation: ExitReservationDetails {
                start_time: format_gate_time(reservation.start_date),
                end_time: format_gate_time(reservation.end_date),
                current_time: format_gate_time(now),
                original_price: reservation.total_price,
                hourly_rate: parking.hourly_rate,
                vehicle: ExitVehicleDetails {
                    plate: vehicle.plate,
                    make: vehicle.make,
                    model: vehicle.model,
                },
            },
            overstay: OverstayDetails {
                minutes: charge.minutes,
                hours: charge.hours,
                additional_fee: charge.fee,
                needs_payment,
            },
            payment_url,
        })
    }

    async fn find_vehicle(&self, plate: &str) -> Result<Vehicle> {
        let plate = normalize_plate(plate);
        self.db
            .find_one("vehicle", "plate", &plate)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    async fn overstay_payment_link(&self, reservation_id: &str, fee: f64) -> Result<String> {
        let tracking_id = format!("overstay-{}", Uuid::new_v4());
        let success_link = format!(
            "{}/api/gate/payment/success?reservation_id={}&tracking_id={}",
            self.config.public_base_url, reservation_id, tracking_id
        );
        let fail_link = format!(
            "{}/api/gate/payment/fail?reservation_id={}&tracking_id={}",
            self.config.public_base_url, reservation_id, tracking_id
        );

        self.payment_service
            .create_payment(fee, &tracking_id, &success_link, &fail_link)
            .await
    }
}

/// 欠费且尚未结清才拦截
fn requires_payment(fee: f64, additional_payment_status: Option<PaymentStatus>) -> bool {
    fee > 0.0 && additional_payment_status != Some(PaymentStatus::Confirmed)
}

/// 道闸屏显示用的 HH:MM
fn format_gate_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_gate_time() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 14, 5, 59).unwrap();
        assert_eq!(format_gate_time(at), "14:05");
    }

    #[test]
    fn test_requires_payment() {
        assert!(requires_payment(5.0, None));
        assert!(requires_payment(5.0, Some(PaymentStatus::Pending)));
        assert!(!requires_payment(5.0, Some(PaymentStatus::Confirmed)));
        assert!(!requires_payment(0.0, None));
    }

    #[test]
    fn test_exit_decision_for_45_minute_overstay() {
        // 14:00 结束、14:45 查验、费率 5：欠 5，未结清则拦下
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 14, 45, 0).unwrap();

        let charge = compute_overstay(end, now, 5.0);
        assert_eq!(charge.minutes, 45);
        assert_eq!(charge.hours, 1);
        assert_eq!(charge.fee, 5.0);
        assert!(requires_payment(charge.fee, None));
        assert!(!requires_payment(charge.fee, Some(PaymentStatus::Confirmed)));
    }
}
