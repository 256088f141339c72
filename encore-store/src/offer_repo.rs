use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use encore_core::repository::OfferRepository;
use encore_core::RepoResult;
use encore_shared::{AcceptanceSlot, Offer, Party};

const OFFER_COLUMNS: &str = "id, date, price, event_id, artist, place, artist_accept_date, place_accept_date, \
     decline_author, decline_date, decline_reason, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    date: DateTime<Utc>,
    price: f64,
    event_id: Option<Uuid>,
    artist: Uuid,
    place: Uuid,
    artist_accept_date: Option<DateTime<Utc>>,
    place_accept_date: Option<DateTime<Utc>>,
    decline_author: Option<Uuid>,
    decline_date: Option<DateTime<Utc>>,
    decline_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OfferRow> for Offer {
    fn from(row: OfferRow) -> Self {
        Offer {
            id: row.id,
            date: row.date,
            price: row.price,
            event: row.event_id,
            artist: row.artist,
            place: row.place,
            artist_accept_date: row.artist_accept_date,
            place_accept_date: row.place_accept_date,
            decline_author: row.decline_author,
            decline_date: row.decline_date,
            decline_reason: row.decline_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn party_column(party: Party) -> &'static str {
    match party {
        Party::Artist => "artist",
        Party::Place => "place",
    }
}

/// Writes the slot once. A repeated accept leaves the row untouched.
fn stamp_acceptance_sql(slot: AcceptanceSlot) -> String {
    format!(
        r#"
        UPDATE offers
        SET {column} = COALESCE({column}, $2),
            decline_author = CASE WHEN {column} IS NULL THEN NULL ELSE decline_author END,
            decline_date = CASE WHEN {column} IS NULL THEN NULL ELSE decline_date END,
            decline_reason = CASE WHEN {column} IS NULL THEN NULL ELSE decline_reason END,
            updated_at = CASE WHEN {column} IS NULL THEN $2 ELSE updated_at END
        WHERE id = $1
        RETURNING {columns}
        "#,
        column = slot.column(),
        columns = OFFER_COLUMNS
    )
}

pub struct PostgresOfferRepository {
    pub pool: PgPool,
}

impl PostgresOfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfferRepository for PostgresOfferRepository {
    async fn insert_offer(&self, offer: &Offer) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO offers (id, date, price, event_id, artist, place, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(offer.id)
        .bind(offer.date)
        .bind(offer.price)
        .bind(offer.event)
        .bind(offer.artist)
        .bind(offer.place)
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_offer(&self, id: Uuid) -> RepoResult<Option<Offer>> {
        let row: Option<OfferRow> = sqlx::query_as(&format!("SELECT {} FROM offers WHERE id = $1", OFFER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Offer::from))
    }

    async fn list_offers(&self, party: Party, user_id: Uuid, counterparty: Option<Uuid>) -> RepoResult<Vec<Offer>> {
        let rows: Vec<OfferRow> = sqlx::query_as(&format!(
            "SELECT {} FROM offers WHERE {} = $1 AND ($2::uuid IS NULL OR {} = $2) ORDER BY date",
            OFFER_COLUMNS,
            party_column(party),
            party_column(party.counterpart())
        ))
        .bind(user_id)
        .bind(counterparty)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Offer::from).collect())
    }

    async fn find_event_offer(
        &self,
        party: Party,
        user_id: Uuid,
        counterparty: Uuid,
        event_id: Uuid,
    ) -> RepoResult<Option<Offer>> {
        let row: Option<OfferRow> = sqlx::query_as(&format!(
            "SELECT {} FROM offers WHERE {} = $1 AND {} = $2 AND event_id = $3 ORDER BY created_at LIMIT 1",
            OFFER_COLUMNS,
            party_column(party),
            party_column(party.counterpart())
        ))
        .bind(user_id)
        .bind(counterparty)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Offer::from))
    }

    async fn revise_offer(&self, id: Uuid, date: DateTime<Utc>, price: f64, event: Option<Uuid>) -> RepoResult<Option<Offer>> {
        let row: Option<OfferRow> = sqlx::query_as(&format!(
            "UPDATE offers SET date = $2, price = $3, event_id = COALESCE(event_id, $4), updated_at = NOW() WHERE id = $1 RETURNING {}",
            OFFER_COLUMNS
        ))
        .bind(id)
        .bind(date)
        .bind(price)
        .bind(event)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Offer::from))
    }

    async fn stamp_acceptance(&self, id: Uuid, slot: AcceptanceSlot, at: DateTime<Utc>) -> RepoResult<Option<Offer>> {
        let row: Option<OfferRow> = sqlx::query_as(&stamp_acceptance_sql(slot))
            .bind(id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Offer::from))
    }

    async fn decline_offer(&self, id: Uuid, author: Uuid, reason: &str, at: DateTime<Utc>) -> RepoResult<Option<Offer>> {
        let row: Option<OfferRow> = sqlx::query_as(&format!(
            r#"
            UPDATE offers
            SET artist_accept_date = NULL, place_accept_date = NULL,
                decline_author = $2, decline_date = $3, decline_reason = $4, updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            OFFER_COLUMNS
        ))
        .bind(id)
        .bind(author)
        .bind(at)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Offer::from))
    }

    async fn claim_event(&self, id: Uuid, event_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE offers SET event_id = $2, updated_at = NOW() WHERE id = $1 AND event_id IS NULL")
            .bind(id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_event(&self, id: Uuid, event_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE offers SET event_id = NULL WHERE id = $1 AND event_id = $2")
            .bind(id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_only_touches_an_empty_slot() {
        let sql = stamp_acceptance_sql(AcceptanceSlot::PlaceAcceptDate);
        assert!(sql.contains("place_accept_date = COALESCE(place_accept_date, $2)"));
        assert!(sql.contains("updated_at = CASE WHEN place_accept_date IS NULL THEN $2 ELSE updated_at END"));
        assert!(sql.contains("decline_date = CASE WHEN place_accept_date IS NULL THEN NULL ELSE decline_date END"));
        assert!(!sql.contains("artist_accept_date ="));
    }
}
