use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use encore_core::repository::TourRepository;
use encore_core::RepoResult;
use encore_shared::{Stage, Tour};

use crate::sql::location;

const TOUR_COLUMNS: &str =
    "id, artist, name, start_address, start_lng, start_lat, end_address, end_lng, end_lat";
const STAGE_COLUMNS: &str = "id, tour, offer, event, address, lng, lat, date";

#[derive(sqlx::FromRow)]
struct TourRow {
    id: Uuid,
    artist: Uuid,
    name: String,
    start_address: String,
    start_lng: f64,
    start_lat: f64,
    end_address: String,
    end_lng: f64,
    end_lat: f64,
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            artist: row.artist,
            name: row.name,
            start_location: location(row.start_address, row.start_lng, row.start_lat),
            end_location: location(row.end_address, row.end_lng, row.end_lat),
        }
    }
}

#[derive(sqlx::FromRow)]
struct StageRow {
    id: Uuid,
    tour: Uuid,
    offer: Option<Uuid>,
    event: Option<Uuid>,
    address: String,
    lng: f64,
    lat: f64,
    date: DateTime<Utc>,
}

impl From<StageRow> for Stage {
    fn from(row: StageRow) -> Self {
        Stage {
            id: row.id,
            tour: row.tour,
            offer: row.offer,
            event: row.event,
            location: location(row.address, row.lng, row.lat),
            date: row.date,
        }
    }
}

pub struct PostgresTourRepository {
    pub pool: PgPool,
}

impl PostgresTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TourRepository for PostgresTourRepository {
    async fn insert_tour(&self, tour: &Tour) -> RepoResult<()> {
        sqlx::query(&format!(
            "INSERT INTO tours ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            TOUR_COLUMNS
        ))
        .bind(tour.id)
        .bind(tour.artist)
        .bind(&tour.name)
        .bind(&tour.start_location.address)
        .bind(tour.start_location.coordinates.lng())
        .bind(tour.start_location.coordinates.lat())
        .bind(&tour.end_location.address)
        .bind(tour.end_location.coordinates.lng())
        .bind(tour.end_location.coordinates.lat())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_tour(&self, id: Uuid) -> RepoResult<Option<Tour>> {
        let row: Option<TourRow> = sqlx::query_as(&format!("SELECT {} FROM tours WHERE id = $1", TOUR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Tour::from))
    }

    async fn tours_of(&self, artist: Uuid) -> RepoResult<Vec<Tour>> {
        let rows: Vec<TourRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tours WHERE artist = $1 ORDER BY name",
            TOUR_COLUMNS
        ))
        .bind(artist)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Tour::from).collect())
    }

    async fn update_tour(&self, tour: &Tour) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tours
            SET name = $2, start_address = $3, start_lng = $4, start_lat = $5,
                end_address = $6, end_lng = $7, end_lat = $8
            WHERE id = $1
            "#,
        )
        .bind(tour.id)
        .bind(&tour.name)
        .bind(&tour.start_location.address)
        .bind(tour.start_location.coordinates.lng())
        .bind(tour.start_location.coordinates.lat())
        .bind(&tour.end_location.address)
        .bind(tour.end_location.coordinates.lng())
        .bind(tour.end_location.coordinates.lat())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_tour(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_stage(&self, stage: &Stage) -> RepoResult<()> {
        sqlx::query(&format!(
            "INSERT INTO stages ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            STAGE_COLUMNS
        ))
        .bind(stage.id)
        .bind(stage.tour)
        .bind(stage.offer)
        .bind(stage.event)
        .bind(&stage.location.address)
        .bind(stage.location.coordinates.lng())
        .bind(stage.location.coordinates.lat())
        .bind(stage.date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_stage(&self, id: Uuid) -> RepoResult<Option<Stage>> {
        let row: Option<StageRow> = sqlx::query_as(&format!("SELECT {} FROM stages WHERE id = $1", STAGE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Stage::from))
    }

    async fn stages_of(&self, tour: Uuid) -> RepoResult<Vec<Stage>> {
        let rows: Vec<StageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM stages WHERE tour = $1 ORDER BY date",
            STAGE_COLUMNS
        ))
        .bind(tour)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Stage::from).collect())
    }

    async fn update_stage(&self, stage: &Stage) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE stages SET offer = $2, event = $3, address = $4, lng = $5, lat = $6, date = $7 WHERE id = $1",
        )
        .bind(stage.id)
        .bind(stage.offer)
        .bind(stage.event)
        .bind(&stage.location.address)
        .bind(stage.location.coordinates.lng())
        .bind(stage.location.coordinates.lat())
        .bind(stage.date)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_stage(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM stages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
