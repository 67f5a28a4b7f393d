use crate::{
    error::{AppError, Result},
    models::{
        parking::{CreateParkingRequest, Parking, UpdateParkingRequest},
        spot::{ParkingSpot, SpotAvailability},
    },
    services::Database,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct ParkingService {
    db: Arc<Database>,
}

#[derive(Debug, Deserialize)]
struct BusySpotRow {
    spot_id: String,
}

impl ParkingService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn create_parking(&self, request: CreateParkingRequest) -> Result<Parking> {
        request.validate().map_err(AppError::ValidatorError)?;

        let now = Utc::now();
        let parking = Parking {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            address: request.address,
            capacity: request.capacity,
            hourly_rate: request.hourly_rate,
            latitude: request.latitude,
            longitude: request.longitude,
            average_rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        };

        let data = serde_json::to_value(&parking)?;
        let created: Parking = self.db.create("parking", &parking.id, data).await?;
        Ok(created)
    }

    pub async fn get_all_parkings(&self) -> Result<Vec<Parking>> {
        self.db.select_all("parking").await
    }

    pub async fn get_parking(&self, parking_id: &str) -> Result<Parking> {
        self.db
            .get_by_id("parking", parking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parking not found".to_string()))
    }

    pub async fn update_parking(
        &self,
        parking_id: &str,
        request: UpdateParkingRequest,
    ) -> Result<Parking> {
        request.validate().map_err(AppError::ValidatorError)?;

        // 确认存在，避免 MERGE 隐式建新记录
        self.get_parking(parking_id).await?;

        let mut updates = serde_json::Map::new();
        if let Some(name) = request.name {
            updates.insert("name".to_string(), json!(name));
        }
        if let Some(address) = request.address {
            updates.insert("address".to_string(), json!(address));
        }
        if let Some(capacity) = request.capacity {
            updates.insert("capacity".to_string(), json!(capacity));
        }
        if let Some(hourly_rate) = request.hourly_rate {
            updates.insert("hourly_rate".to_string(), json!(hourly_rate));
        }
        if let Some(latitude) = request.latitude {
            updates.insert("latitude".to_string(), json!(latitude));
        }
        if let Some(longitude) = request.longitude {
            updates.insert("longitude".to_string(), json!(longitude));
        }
        updates.insert("updated_at".to_string(), json!(Utc::now()));

        self.db
            .merge_by_id("parking", parking_id, json!(updates))
            .await?
            .ok_or_else(|| AppError::internal("Failed to update parking"))
    }

    pub async fn delete_parking(&self, parking_id: &str) -> Result<()> {
        let existed = self.db.delete_by_id("parking", parking_id).await?;
        if !existed {
            return Err(AppError::NotFound("Parking not found".to_string()));
        }
        Ok(())
    }

    /// Compute per-spot availability for a lot over `[start_date, end_date)`.
    ///
    /// A spot is unavailable when any pending or confirmed reservation on it
    /// overlaps the window (`existing.start < end AND existing.end > start`).
    /// An unknown parking id yields an empty list. Read-only: a free answer
    /// here is not a hold, the reservation writer re-checks inside its
    /// transaction.
    pub async fn find_available_spots(
        &self,
        parking_id: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Vec<SpotAvailability>> {
        if start_date >= end_date {
            return Err(AppError::Validation(
                "start_date must be before end_date".to_string(),
            ));
        }

        debug!(
            "Checking spot availability for parking {} between {} and {}",
            parking_id, start_date, end_date
        );

        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM parking_spot WHERE parking_id = $parking_id",
                json!({ "parking_id": parking_id }),
            )
            .await?;
        let spots: Vec<ParkingSpot> = response.take(0)?;

        if spots.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = self
            .db
            .query_with_params(
                r#"
                SELECT spot_id FROM reservation
                WHERE parking_id = $parking_id
                  AND status IN ['pending', 'confirmed']
                  AND start_date < <datetime> $end_date
                  AND end_date > <datetime> $start_date
                "#,
                json!({
                    "parking_id": parking_id,
                    "start_date": start_date,
                    "end_date": end_date,
                }),
            )
            .await?;
        let busy_rows: Vec<BusySpotRow> = response.take(0)?;
        let busy: HashSet<String> = busy_rows.into_iter().map(|r| r.spot_id).collect();

        Ok(mark_availability(spots, &busy))
    }

    /// 根据全部评论重算停车场的平均评分与评论数
    pub async fn recompute_rating(&self, parking_id: &str) -> Result<()> {
        #[derive(Debug, Deserialize)]
        struct RatingRow {
            rating: i32,
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT rating FROM review WHERE parking_id = $parking_id",
                json!({ "parking_id": parking_id }),
            )
            .await?;
        let ratings: Vec<RatingRow> = response.take(0)?;

        let review_count = ratings.len() as i64;
        let average_rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| r.rating as f64).sum::<f64>() / review_count as f64
        };

        let updated: Option<Parking> = self
            .db
            .merge_by_id(
                "parking",
                parking_id,
                json!({
                    "average_rating": average_rating,
                    "review_count": review_count,
                    "updated_at": Utc::now(),
                }),
            )
            .await?;

        if updated.is_none() {
            return Err(AppError::NotFound("Parking not found".to_string()));
        }

        debug!(
            "Recomputed rating for parking {}: {:.2} over {} reviews",
            parking_id, average_rating, review_count
        );
        Ok(())
    }
}

/// 被重叠预订占用的车位不可用，其余全部可用
fn mark_availability(spots: Vec<ParkingSpot>, busy: &HashSet<String>) -> Vec<SpotAvailability> {
    spots
        .into_iter()
        .map(|spot| {
            let is_available = !busy.contains(&spot.id);
            SpotAvailability { spot, is_available }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(id: &str) -> ParkingSpot {
        ParkingSpot {
            id: id.to_string(),
            parking_id: "p1".to_string(),
            number: id.to_string(),
        }
    }

    #[test]
    fn test_busy_spot_is_never_available() {
        let busy: HashSet<String> = ["a".to_string()].into_iter().collect();
        let marked = mark_availability(vec![spot("a"), spot("b")], &busy);

        assert_eq!(marked.len(), 2);
        assert!(!marked[0].is_available);
        assert!(marked[1].is_available);
    }

    #[test]
    fn test_unreferenced_spots_are_all_available() {
        let busy = HashSet::new();
        let marked = mark_availability(vec![spot("a"), spot("b"), spot("c")], &busy);
        assert!(marked.iter().all(|s| s.is_available));
    }

    #[test]
    fn test_no_spots_yields_empty() {
        let busy: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(mark_availability(Vec::new(), &busy).is_empty());
    }
}
