//! Integration and unit tests for the brainvault backend.
//!
//! ## Test Modules
//!
//! - **api_tests**: end-to-end flows through the full router
//! - **error_tests**: error mapping and response envelopes
//! - **config_tests**: configuration loading and validation
//! - **db_tests**: schema initialization and shared queries
//! - **health_api_tests**: health, readiness, metrics and version endpoints
//!
//! Run a single module with e.g. `cargo test api_tests`.

pub mod config_tests;
pub mod error_tests;

use sqlx::sqlite::SqlitePoolOptions;

use crate::config::AppConfig;
use crate::state::AppState;

/// Fresh in-memory database with the schema applied. A single connection keeps
/// every query on the same in-memory database.
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
    crate::db::init_db(&pool).await.unwrap();
    pool
}

pub(crate) async fn test_state_with(config: AppConfig) -> AppState {
    AppState::new(test_pool().await, config)
}

pub(crate) async fn test_state() -> AppState {
    test_state_with(AppConfig::default()).await
}
