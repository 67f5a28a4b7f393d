use crate::{
    error::{AppError, Result},
    models::{
        parking::Parking,
        spot::{CreateSpotRequest, ParkingSpot, SpotWithParking, UpdateSpotRequest},
    },
    services::Database,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct SpotService {
    db: Arc<Database>,
}

impl SpotService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn create_spot(&self, request: CreateSpotRequest) -> Result<ParkingSpot> {
        request.validate().map_err(AppError::ValidatorError)?;

        let _: Parking = self
            .db
            .get_by_id("parking", &request.parking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parking not found".to_string()))?;

        // 同一停车场内编号唯一；唯一索引兜底并发下的重复创建
        let mut response = self
            .db
            .query_with_params(
                "SELECT meta::id(id) AS id FROM parking_spot WHERE parking_id = $parking_id AND number = $number LIMIT 1",
                json!({ "parking_id": request.parking_id, "number": request.number }),
            )
            .await?;
        let existing: Vec<serde_json::Value> = response.take(0)?;
        if !existing.is_empty() {
            return Err(AppError::Conflict(
                "This parking spot already exists".to_string(),
            ));
        }

        let spot = ParkingSpot {
            id: Uuid::new_v4().to_string(),
            parking_id: request.parking_id,
            number: request.number,
        };

        debug!("Creating spot {} in parking {}", spot.number, spot.parking_id);
        let data = serde_json::to_value(&spot)?;
        let created: ParkingSpot = self.db.create("parking_spot", &spot.id, data).await?;
        Ok(created)
    }

    pub async fn get_all_spots(&self) -> Result<Vec<SpotWithParking>> {
        let spots: Vec<ParkingSpot> = self.db.select_all("parking_spot").await?;
        self.with_parkings(spots).await
    }

    pub async fn get_spot(&self, spot_id: &str) -> Result<SpotWithParking> {
        let spot: ParkingSpot = self
            .db
            .get_by_id("parking_spot", spot_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parking spot not found".to_string()))?;

        let parking: Option<Parking> = self.db.get_by_id("parking", &spot.parking_id).await?;
        Ok(SpotWithParking { spot, parking })
    }

    pub async fn get_spots_by_parking(&self, parking_id: &str) -> Result<Vec<SpotWithParking>> {
        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM parking_spot WHERE parking_id = $parking_id",
                json!({ "parking_id": parking_id }),
            )
            .await?;
        let spots: Vec<ParkingSpot> = response.take(0)?;
        self.with_parkings(spots).await
    }

    pub async fn update_spot(&self, spot_id: &str, request: UpdateSpotRequest) -> Result<ParkingSpot> {
        request.validate().map_err(AppError::ValidatorError)?;

        let spot: ParkingSpot = self
            .db
            .get_by_id("parking_spot", spot_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parking spot not found".to_string()))?;

        let number = match request.number {
            Some(number) => number,
            None => return Ok(spot),
        };

        self.db
            .merge_by_id("parking_spot", spot_id, json!({ "number": number }))
            .await?
            .ok_or_else(|| AppError::internal("Failed to update parking spot"))
    }

    pub async fn delete_spot(&self, spot_id: &str) -> Result<()> {
        let existed = self.db.delete_by_id("parking_spot", spot_id).await?;
        if !existed {
            return Err(AppError::NotFound("Parking spot not found".to_string()));
        }
        Ok(())
    }

    async fn with_parkings(&self, spots: Vec<ParkingSpot>) -> Result<Vec<SpotWithParking>> {
        let mut result = Vec::with_capacity(spots.len());
        for spot in spots {
            let parking: Option<Parking> = self.db.get_by_id("parking", &spot.parking_id).await?;
            result.push(SpotWithParking { spot, parking });
        }
        Ok(result)
    }
}
