/// Blog Service Library
///
/// Posts, groups and author profiles for the Yatube blog platform.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Users, authors, groups and posts
/// - `forms`: Input cleaning and field-level validation
/// - `pagination`: Page windows over post listings
/// - `services`: Business logic layer
/// - `db`: Repository trait and PostgreSQL implementation
/// - `middleware`: JWT authentication, permissions and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
