pub mod app_config;
pub mod database;
pub mod memory;
pub mod redis_repo;
pub mod sql;
pub mod user_repo;
pub mod event_repo;
pub mod offer_repo;
pub mod chat_repo;
pub mod participation_repo;
pub mod tour_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use memory::MemoryStore;
pub use redis_repo::RedisClient;
