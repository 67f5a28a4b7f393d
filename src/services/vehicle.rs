use crate::{
    error::{AppError, Result},
    models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle},
    services::Database,
    utils::validation::normalize_plate,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct VehicleService {
    db: Arc<Database>,
}

impl VehicleService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn create_vehicle(
        &self,
        user_id: &str,
        request: CreateVehicleRequest,
    ) -> Result<Vehicle> {
        request.validate().map_err(AppError::ValidatorError)?;

        let plate = normalize_plate(&request.plate);
        debug!("Registering vehicle {} for user {}", plate, user_id);

        // 车牌全局唯一；唯一索引兜底并发注册
        let existing: Option<Vehicle> = self.db.find_one("vehicle", "plate", &plate).await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "A vehicle with this plate is already registered".to_string(),
            ));
        }

        let vehicle = Vehicle {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            plate,
            make: request.make,
            model: request.model,
            color: request.color,
            created_at: Utc::now(),
        };

        let data = serde_json::to_value(&vehicle)?;
        let created: Vehicle = self.db.create("vehicle", &vehicle.id, data).await?;
        Ok(created)
    }

    pub async fn get_all_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.db.select_all("vehicle").await
    }

    pub async fn get_vehicle(&self, vehicle_id: &str) -> Result<Vehicle> {
        self.db
            .get_by_id("vehicle", vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    pub async fn get_vehicle_by_plate(&self, plate: &str) -> Result<Vehicle> {
        let plate = normalize_plate(plate);
        self.db
            .find_one("vehicle", "plate", &plate)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    pub async fn get_vehicles_by_user(&self, user_id: &str) -> Result<Vec<Vehicle>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM vehicle WHERE user_id = $user_id ORDER BY created_at DESC",
                json!({ "user_id": user_id }),
            )
            .await?;
        let vehicles: Vec<Vehicle> = response.take(0)?;
        Ok(vehicles)
    }

    pub async fn update_vehicle(
        &self,
        vehicle_id: &str,
        user_id: &str,
        request: UpdateVehicleRequest,
    ) -> Result<Vehicle> {
        request.validate().map_err(AppError::ValidatorError)?;

        let vehicle = self.get_vehicle(vehicle_id).await?;
        if vehicle.user_id != user_id {
            return Err(AppError::forbidden("You can only update your own vehicles"));
        }

        let mut updates = serde_json::Map::new();
        if let Some(make) = request.make {
            updates.insert("make".to_string(), json!(make));
        }
        if let Some(model) = request.model {
            updates.insert("model".to_string(), json!(model));
        }
        if let Some(color) = request.color {
            updates.insert("color".to_string(), json!(color));
        }
        if updates.is_empty() {
            return Ok(vehicle);
        }

        self.db
            .merge_by_id("vehicle", vehicle_id, json!(updates))
            .await?
            .ok_or_else(|| AppError::internal("Failed to update vehicle"))
    }

    pub async fn delete_vehicle(&self, vehicle_id: &str, user_id: &str) -> Result<()> {
        let vehicle = self.get_vehicle(vehicle_id).await?;
        if vehicle.user_id != user_id {
            return Err(AppError::forbidden("You can only delete your own vehicles"));
        }

        self.db.delete_by_id("vehicle", vehicle_id).await?;
        Ok(())
    }
}
