use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use encore_core::repository::EventRepository;
use encore_core::search::{EventSearch, RESULT_LIMIT};
use encore_core::RepoResult;
use encore_shared::{Event, GeoPoint};

use crate::sql::{location, push_any_term, push_any_typology, push_distance, push_within_radius};

const EVENT_COLUMNS: &str = "id, artists, name, description, picture, place, date, address, lng, lat, typologies, \
     price, qrcode, place_name, artists_names";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    artists: Vec<Uuid>,
    name: String,
    description: String,
    picture: Option<String>,
    place: Uuid,
    date: DateTime<Utc>,
    address: String,
    lng: f64,
    lat: f64,
    typologies: Vec<String>,
    price: Option<f64>,
    qrcode: String,
    place_name: String,
    artists_names: Vec<String>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            artists: row.artists,
            name: row.name,
            description: row.description,
            picture: row.picture,
            place: row.place,
            date: row.date,
            location: location(row.address, row.lng, row.lat),
            typologies: row.typologies,
            price: row.price,
            qrcode: row.qrcode,
            place_name: row.place_name,
            artists_names: row.artists_names,
        }
    }
}

pub struct PostgresEventRepository {
    pub pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, mut qb: QueryBuilder<'_, Postgres>) -> RepoResult<Vec<Event>> {
        let rows: Vec<EventRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn insert_event(&self, event: &Event) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, artists, name, description, picture, place, date, address, lng, lat,
                                typologies, price, qrcode, place_name, artists_names)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(event.id)
        .bind(&event.artists)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.picture.as_deref())
        .bind(event.place)
        .bind(event.date)
        .bind(&event.location.address)
        .bind(event.location.coordinates.lng())
        .bind(event.location.coordinates.lat())
        .bind(&event.typologies)
        .bind(event.price)
        .bind(&event.qrcode)
        .bind(&event.place_name)
        .bind(&event.artists_names)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn get_events(&self, ids: &[Uuid]) -> RepoResult<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events WHERE id = ANY($1) ORDER BY date",
            EVENT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn replace_event(&self, event: &Event) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET name = $2, description = $3, picture = $4, date = $5, address = $6, lng = $7, lat = $8,
                typologies = $9, price = $10
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.picture.as_deref())
        .bind(event.date)
        .bind(&event.location.address)
        .bind(event.location.coordinates.lng())
        .bind(event.location.coordinates.lat())
        .bind(&event.typologies)
        .bind(event.price)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_event(&self, id: Uuid) -> RepoResult<bool> {
        // participations go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_artist(&self, event_id: Uuid, artist_id: Uuid, artist_name: &str) -> RepoResult<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            r#"
            UPDATE events
            SET artists = CASE WHEN $2 = ANY(artists) THEN artists ELSE array_append(artists, $2) END,
                artists_names = CASE WHEN $2 = ANY(artists) THEN artists_names ELSE array_append(artists_names, $3) END
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .bind(artist_id)
        .bind(artist_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Event::from))
    }

    async fn events_with_artist(&self, artist_id: Uuid) -> RepoResult<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events WHERE $1 = ANY(artists) ORDER BY date",
            EVENT_COLUMNS
        ))
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn events_of_place(&self, place_id: Uuid) -> RepoResult<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events WHERE place = $1 ORDER BY date",
            EVENT_COLUMNS
        ))
        .bind(place_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn set_place_name(&self, place_id: Uuid, name: &str) -> RepoResult<u64> {
        let result = sqlx::query("UPDATE events SET place_name = $2 WHERE place = $1")
            .bind(place_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_artists_names(&self, event_id: Uuid, names: &[String]) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE events SET artists_names = $2 WHERE id = $1")
            .bind(event_id)
            .bind(names)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_events(&self, search: &EventSearch) -> RepoResult<Vec<Event>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM events WHERE date >= ", EVENT_COLUMNS));
        qb.push_bind(search.from);
        if let Some(to) = search.to {
            qb.push(" AND date <= ").push_bind(to);
        }
        push_any_term(&mut qb, &["name", "place_name", "unnest(artists_names)"], &search.terms);
        if let Some(point) = search.near {
            push_within_radius(&mut qb, "lng", "lat", point);
        }
        push_any_typology(&mut qb, &search.typologies);
        qb.push(" ORDER BY date");
        self.fetch(qb).await
    }

    async fn nearest_events(&self, point: GeoPoint) -> RepoResult<Vec<Event>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM events WHERE TRUE", EVENT_COLUMNS));
        push_within_radius(&mut qb, "lng", "lat", point);
        qb.push(" ORDER BY ");
        push_distance(&mut qb, "lng", "lat", point);
        qb.push(" LIMIT ").push_bind(RESULT_LIMIT as i64);
        self.fetch(qb).await
    }
}
