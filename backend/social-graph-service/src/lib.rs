pub mod app_state;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod ranking;
pub mod routes;
pub mod services;
pub mod validators;

pub use app_state::{AppServices, AppState};
pub use config::Config;
pub use db::GraphClient;
pub use error::{AppError, Result};
