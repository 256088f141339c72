use std::sync::Arc;

use encore_core::Repositories;
use encore_offer::OfferWorkflow;
use encore_store::RedisClient;

use crate::notifier::Notifier;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub offers: OfferWorkflow,
    pub notifier: Notifier,
    pub redis: Option<Arc<RedisClient>>,
    pub auth: AuthConfig,
    /// Public base URL of the web app
    pub domain: String,
    pub requests_per_minute: i64,
}

impl AppState {
    pub fn new(repos: Repositories, auth: AuthConfig, domain: impl Into<String>) -> Self {
        Self {
            offers: OfferWorkflow::new(repos.clone()),
            repos,
            notifier: Notifier::new(),
            redis: None,
            auth,
            domain: domain.into(),
            requests_per_minute: 120,
        }
    }

    pub fn with_rate_limit(mut self, redis: Arc<RedisClient>, requests_per_minute: i64) -> Self {
        self.redis = Some(redis);
        self.requests_per_minute = requests_per_minute;
        self
    }
}
