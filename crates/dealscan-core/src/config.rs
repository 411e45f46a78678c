use std::collections::HashMap;
use std::path::PathBuf;

use crate::app_config::{AppConfig, KeepaSettings, PaapiCredentials, ProviderKind};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load application configuration, letting `overrides` (keyed by env var
/// name) take precedence over the process environment.
///
/// The CLI maps its flags onto env var names and passes them here, so a
/// flag wins over both `.env` and the environment.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_with_overrides(
    overrides: &HashMap<String, String>,
) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| match overrides.get(key) {
        Some(value) => Ok(value.clone()),
        None => std::env::var(key),
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are only required for the provider that is actually selected:
/// `paapi` needs access key, secret key and partner tag; `keepa` runs without
/// a key (its client degrades to empty results).
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let provider = or_default("DEALSCAN_PROVIDER", "paapi")
        .parse::<ProviderKind>()
        .map_err(|reason| invalid("DEALSCAN_PROVIDER", reason))?;

    let input_dir = PathBuf::from(or_default("DEALSCAN_INPUT_DIR", "./input"));
    let output_dir = PathBuf::from(or_default("DEALSCAN_OUTPUT_DIR", "./output"));
    let log_level = or_default("DEALSCAN_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("DEALSCAN_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("DEALSCAN_USER_AGENT", "dealscan/0.1 (deal-discovery)");
    let max_retries = parse_u32("DEALSCAN_MAX_RETRIES", "1")?;

    let batch_size = match optional("DEALSCAN_BATCH_SIZE") {
        None => None,
        Some(raw) => {
            let n = raw
                .parse::<usize>()
                .map_err(|e| invalid("DEALSCAN_BATCH_SIZE", e.to_string()))?;
            if n == 0 {
                return Err(invalid("DEALSCAN_BATCH_SIZE", "must be at least 1".into()));
            }
            Some(n)
        }
    };

    let min_interval_ms = optional("DEALSCAN_MIN_INTERVAL_MS")
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| invalid("DEALSCAN_MIN_INTERVAL_MS", e.to_string()))
        })
        .transpose()?;

    let paapi = match provider {
        ProviderKind::Paapi => Some(PaapiCredentials {
            access_key: require("PAAPI_ACCESS_KEY")?,
            secret_key: require("PAAPI_SECRET_KEY")?,
            partner_tag: require("PAAPI_PARTNER_TAG")?,
            host: or_default("PAAPI_HOST", "webservices.amazon.com"),
            region: or_default("PAAPI_REGION", "us-east-1"),
            marketplace: or_default("PAAPI_MARKETPLACE", "www.amazon.com"),
        }),
        ProviderKind::Keepa => None,
    };

    let keepa_domain = or_default("KEEPA_DOMAIN", "1")
        .parse::<u8>()
        .map_err(|e| invalid("KEEPA_DOMAIN", e.to_string()))?;
    let keepa = KeepaSettings {
        api_key: optional("KEEPA_API_KEY"),
        domain: keepa_domain,
    };

    let affiliate_tag = optional("AFFILIATE_TAG");
    let affiliate_domain = or_default("AFFILIATE_DOMAIN", "www.amazon.com");
    let proxy_url = optional("PROXY_URL");

    Ok(AppConfig {
        provider,
        input_dir,
        output_dir,
        log_level,
        request_timeout_secs,
        user_agent,
        batch_size,
        min_interval_ms,
        max_retries,
        paapi,
        keepa,
        affiliate_tag,
        affiliate_domain,
        proxy_url,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
