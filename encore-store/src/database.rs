use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use encore_core::Repositories;

use crate::chat_repo::PostgresConversationRepository;
use crate::event_repo::PostgresEventRepository;
use crate::offer_repo::PostgresOfferRepository;
use crate::participation_repo::{PostgresFeedbackRepository, PostgresParticipationRepository};
use crate::tour_repo::PostgresTourRepository;
use crate::user_repo::PostgresUserRepository;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(PostgresUserRepository::new(self.pool.clone())),
            events: Arc::new(PostgresEventRepository::new(self.pool.clone())),
            offers: Arc::new(PostgresOfferRepository::new(self.pool.clone())),
            conversations: Arc::new(PostgresConversationRepository::new(self.pool.clone())),
            participations: Arc::new(PostgresParticipationRepository::new(self.pool.clone())),
            feedbacks: Arc::new(PostgresFeedbackRepository::new(self.pool.clone())),
            tours: Arc::new(PostgresTourRepository::new(self.pool.clone())),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
