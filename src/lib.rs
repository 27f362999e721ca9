//! # brainvault backend library
//!
//! A "second brain" bookmark service: users sign up, store links to external
//! content (articles, videos, tweets, audio, images) tagged with free-form labels,
//! and can publish a read-only view of their collection behind a short hash.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server, routing and middleware
//! - **SQLx**: asynchronous SQLite access
//! - **jsonwebtoken / argon2**: bearer tokens and password hashing
//! - **validator**: request body schemas
//!
//! ## Core Components
//!
//! - [`auth`]: token service and password hashing
//! - [`config`]: layered application configuration
//! - [`db`]: schema initialization and shared queries
//! - [`error`]: centralized error handling and HTTP error responses
//! - [`hashnum`]: share-link hash
//! - [`metrics`]: request and domain counters
//! - [`middleware`]: authentication, security headers, rate limiting, validation
//! - [`models`]: records, request bodies and DTOs
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: shared application state

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod hashnum;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;
