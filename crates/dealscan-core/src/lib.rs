//! Shared domain types and configuration for dealscan.

pub mod app_config;
pub mod config;
pub mod deals;

pub use app_config::{AppConfig, KeepaSettings, PaapiCredentials, ProviderKind};
pub use config::{load_app_config, load_app_config_from_env, load_app_config_with_overrides};
pub use deals::{round_currency, sort_by_discount, DealRecord, Discount};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
