use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use encore_core::repository::{FeedbackRepository, ParticipationRepository};
use encore_core::RepoResult;
use encore_shared::{Feedback, Participation};

const PARTICIPATION_COLUMNS: &str = "id, event, user_id, can_review, has_reviewed";
const FEEDBACK_COLUMNS: &str = "id, event, author, receiver, reliability_rating, reliability_text, \
     performance_rating, performance_text, created_at";

#[derive(sqlx::FromRow)]
struct ParticipationRow {
    id: Uuid,
    event: Uuid,
    user_id: Uuid,
    can_review: bool,
    has_reviewed: bool,
}

impl From<ParticipationRow> for Participation {
    fn from(row: ParticipationRow) -> Self {
        Participation {
            id: row.id,
            event: row.event,
            user: row.user_id,
            can_review: row.can_review,
            has_reviewed: row.has_reviewed,
        }
    }
}

pub struct PostgresParticipationRepository {
    pub pool: PgPool,
}

impl PostgresParticipationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipationRepository for PostgresParticipationRepository {
    async fn get_participation(&self, event: Uuid, user: Uuid) -> RepoResult<Option<Participation>> {
        let row: Option<ParticipationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM participations WHERE event = $1 AND user_id = $2",
            PARTICIPATION_COLUMNS
        ))
        .bind(event)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Participation::from))
    }

    async fn join_event(&self, event: Uuid, user: Uuid) -> RepoResult<Participation> {
        let fresh = Participation::new(event, user);
        let row: ParticipationRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO participations (id, event, user_id) VALUES ($1, $2, $3)
            ON CONFLICT (event, user_id) DO UPDATE SET event = EXCLUDED.event
            RETURNING {}
            "#,
            PARTICIPATION_COLUMNS
        ))
        .bind(fresh.id)
        .bind(event)
        .bind(user)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn leave_event(&self, event: Uuid, user: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM participations WHERE event = $1 AND user_id = $2")
            .bind(event)
            .bind(user)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_participants(&self, event: Uuid) -> RepoResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM participations WHERE event = $1")
            .bind(event)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn participations_of(&self, user: Uuid) -> RepoResult<Vec<Participation>> {
        let rows: Vec<ParticipationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM participations WHERE user_id = $1",
            PARTICIPATION_COLUMNS
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Participation::from).collect())
    }

    async fn unlock_review(&self, event: Uuid, user: Uuid) -> RepoResult<Participation> {
        let fresh = Participation::new(event, user);
        let row: ParticipationRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO participations (id, event, user_id, can_review) VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (event, user_id) DO UPDATE SET can_review = TRUE
            RETURNING {}
            "#,
            PARTICIPATION_COLUMNS
        ))
        .bind(fresh.id)
        .bind(event)
        .bind(user)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn set_reviewed(&self, event: Uuid, user: Uuid, reviewed: bool) -> RepoResult<Option<Participation>> {
        let row: Option<ParticipationRow> = sqlx::query_as(&format!(
            "UPDATE participations SET has_reviewed = $3 WHERE event = $1 AND user_id = $2 RETURNING {}",
            PARTICIPATION_COLUMNS
        ))
        .bind(event)
        .bind(user)
        .bind(reviewed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Participation::from))
    }
}

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: Uuid,
    event: Uuid,
    author: Uuid,
    receiver: Uuid,
    reliability_rating: Option<i16>,
    reliability_text: Option<String>,
    performance_rating: i16,
    performance_text: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            event: row.event,
            author: row.author,
            receiver: row.receiver,
            reliability_rating: row.reliability_rating.map(|r| r.clamp(0, 5) as u8),
            reliability_text: row.reliability_text,
            performance_rating: row.performance_rating.clamp(0, 5) as u8,
            performance_text: row.performance_text,
            created_at: row.created_at,
        }
    }
}

pub struct PostgresFeedbackRepository {
    pub pool: PgPool,
}

impl PostgresFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn insert_feedback(&self, feedback: &Feedback) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO feedbacks (id, event, author, receiver, reliability_rating, reliability_text,
                                   performance_rating, performance_text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.event)
        .bind(feedback.author)
        .bind(feedback.receiver)
        .bind(feedback.reliability_rating.map(i16::from))
        .bind(feedback.reliability_text.as_deref())
        .bind(i16::from(feedback.performance_rating))
        .bind(feedback.performance_text.as_deref())
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_feedback(&self, id: Uuid) -> RepoResult<Option<Feedback>> {
        let row: Option<FeedbackRow> = sqlx::query_as(&format!("SELECT {} FROM feedbacks WHERE id = $1", FEEDBACK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Feedback::from))
    }

    async fn delete_feedback(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn feedbacks_by_author(&self, author: Uuid) -> RepoResult<Vec<Feedback>> {
        let rows: Vec<FeedbackRow> = sqlx::query_as(&format!(
            "SELECT {} FROM feedbacks WHERE author = $1 ORDER BY created_at DESC",
            FEEDBACK_COLUMNS
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }

    async fn feedbacks_for_receiver(&self, receiver: Uuid) -> RepoResult<Vec<Feedback>> {
        let rows: Vec<FeedbackRow> = sqlx::query_as(&format!(
            "SELECT {} FROM feedbacks WHERE receiver = $1 ORDER BY created_at DESC",
            FEEDBACK_COLUMNS
        ))
        .bind(receiver)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }
}
