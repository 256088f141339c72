use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use encore_core::repository::ConversationRepository;
use encore_core::RepoResult;
use encore_shared::{Conversation, Message, Party};

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    artist: Uuid,
    place: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: row.id,
            artist: row.artist,
            place: row.place,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation: Uuid,
    body: String,
    author: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            conversation: row.conversation,
            body: row.body,
            author: row.author,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PostgresConversationRepository {
    pub pool: PgPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn find_conversation(&self, artist: Uuid, place: Uuid) -> RepoResult<Option<Conversation>> {
        let row: Option<ConversationRow> = sqlx::query_as(
            "SELECT id, artist, place, created_at, updated_at FROM conversations WHERE artist = $1 AND place = $2",
        )
        .bind(artist)
        .bind(place)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Conversation::from))
    }

    async fn create_conversation(&self, conversation: &Conversation) -> RepoResult<Conversation> {
        // the no-op update makes RETURNING yield the existing row on conflict
        let row: ConversationRow = sqlx::query_as(
            r#"
            INSERT INTO conversations (id, artist, place, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (artist, place) DO UPDATE SET artist = EXCLUDED.artist
            RETURNING id, artist, place, created_at, updated_at
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.artist)
        .bind(conversation.place)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_conversation(&self, id: Uuid) -> RepoResult<Option<Conversation>> {
        let row: Option<ConversationRow> =
            sqlx::query_as("SELECT id, artist, place, created_at, updated_at FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Conversation::from))
    }

    async fn list_conversations(&self, party: Party, user_id: Uuid) -> RepoResult<Vec<Conversation>> {
        let sql = match party {
            Party::Artist => {
                "SELECT id, artist, place, created_at, updated_at FROM conversations WHERE artist = $1 ORDER BY updated_at DESC"
            }
            Party::Place => {
                "SELECT id, artist, place, created_at, updated_at FROM conversations WHERE place = $1 ORDER BY updated_at DESC"
            }
        };
        let rows: Vec<ConversationRow> = sqlx::query_as(sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    async fn delete_conversation(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_message(&self, message: &Message) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation, body, author, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(message.conversation)
        .bind(&message.body)
        .bind(message.author)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE conversations SET updated_at = $2 WHERE id = $1")
            .bind(message.conversation)
            .bind(message.created_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_messages(&self, conversation: Uuid) -> RepoResult<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, conversation, body, author, created_at, updated_at FROM messages WHERE conversation = $1 ORDER BY created_at",
        )
        .bind(conversation)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn latest_message(&self, conversation: Uuid) -> RepoResult<Option<Message>> {
        let row: Option<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, conversation, body, author, created_at, updated_at
            FROM messages WHERE conversation = $1
            ORDER BY created_at DESC LIMIT 1
            "#,
        )
        .bind(conversation)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Message::from))
    }

    async fn edit_message(&self, conversation: Uuid, message_id: Uuid, author: Uuid, body: &str) -> RepoResult<Option<Message>> {
        let row: Option<MessageRow> = sqlx::query_as(
            r#"
            UPDATE messages SET body = $4, updated_at = NOW()
            WHERE id = $2 AND conversation = $1 AND author = $3
            RETURNING id, conversation, body, author, created_at, updated_at
            "#,
        )
        .bind(conversation)
        .bind(message_id)
        .bind(author)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Message::from))
    }
}
