use std::collections::HashMap;
use std::env::VarError;
use std::time::Duration;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with the signed-provider credentials populated.
fn paapi_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("PAAPI_ACCESS_KEY", "AKIDEXAMPLE");
    m.insert("PAAPI_SECRET_KEY", "secret");
    m.insert("PAAPI_PARTNER_TAG", "deals-20");
    m
}

fn keepa_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("DEALSCAN_PROVIDER", "keepa");
    m
}

#[test]
fn build_app_config_defaults_to_paapi_and_requires_access_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PAAPI_ACCESS_KEY"),
        "expected MissingEnvVar(PAAPI_ACCESS_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_requires_partner_tag_for_paapi() {
    let mut map = paapi_env();
    map.remove("PAAPI_PARTNER_TAG");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PAAPI_PARTNER_TAG"),
        "expected MissingEnvVar(PAAPI_PARTNER_TAG), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_secret_as_missing() {
    let mut map = paapi_env();
    map.insert("PAAPI_SECRET_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PAAPI_SECRET_KEY"),
        "expected MissingEnvVar(PAAPI_SECRET_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_paapi_credentials() {
    let map = paapi_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.provider, ProviderKind::Paapi);
    assert_eq!(cfg.input_dir, PathBuf::from("./input"));
    assert_eq!(cfg.output_dir, PathBuf::from("./output"));
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.max_retries, 1);
    assert_eq!(cfg.affiliate_domain, "www.amazon.com");
    assert!(cfg.affiliate_tag.is_none());
    assert!(cfg.proxy_url.is_none());

    let paapi = cfg.paapi.as_ref().expect("paapi credentials should be set");
    assert_eq!(paapi.host, "webservices.amazon.com");
    assert_eq!(paapi.region, "us-east-1");
    assert_eq!(paapi.marketplace, "www.amazon.com");
    assert_eq!(paapi.partner_tag, "deals-20");

    assert_eq!(cfg.effective_batch_size(), 10);
    assert_eq!(cfg.min_interval(), Duration::from_secs(1));
}

#[test]
fn build_app_config_keepa_runs_without_api_key() {
    let map = keepa_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.provider, ProviderKind::Keepa);
    assert!(cfg.paapi.is_none());
    assert!(cfg.keepa.api_key.is_none());
    assert_eq!(cfg.keepa.domain, 1);
    assert_eq!(cfg.effective_batch_size(), 100);
    assert_eq!(cfg.min_interval(), Duration::from_secs(60));
}

#[test]
fn build_app_config_keepa_ignores_missing_paapi_credentials() {
    let mut map = keepa_env();
    map.insert("KEEPA_API_KEY", "k-123");
    map.insert("KEEPA_DOMAIN", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.keepa.api_key.as_deref(), Some("k-123"));
    assert_eq!(cfg.keepa.domain, 3);
}

#[test]
fn build_app_config_rejects_unknown_provider() {
    let mut map = paapi_env();
    map.insert("DEALSCAN_PROVIDER", "scraper");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCAN_PROVIDER"),
        "expected InvalidEnvVar(DEALSCAN_PROVIDER), got: {result:?}"
    );
}

#[test]
fn build_app_config_provider_is_case_insensitive() {
    let mut map = keepa_env();
    map.insert("DEALSCAN_PROVIDER", "KEEPA");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.provider, ProviderKind::Keepa);
}

#[test]
fn build_app_config_batch_size_is_clamped_to_provider_max() {
    let mut map = paapi_env();
    map.insert("DEALSCAN_BATCH_SIZE", "25");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.batch_size, Some(25));
    assert_eq!(cfg.effective_batch_size(), 10);
}

#[test]
fn build_app_config_batch_size_below_max_is_kept() {
    let mut map = paapi_env();
    map.insert("DEALSCAN_BATCH_SIZE", "4");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.effective_batch_size(), 4);
}

#[test]
fn build_app_config_rejects_zero_batch_size() {
    let mut map = paapi_env();
    map.insert("DEALSCAN_BATCH_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCAN_BATCH_SIZE"),
        "expected InvalidEnvVar(DEALSCAN_BATCH_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_min_interval_override() {
    let mut map = keepa_env();
    map.insert("DEALSCAN_MIN_INTERVAL_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.min_interval(), Duration::from_millis(250));
}

#[test]
fn build_app_config_min_interval_invalid() {
    let mut map = keepa_env();
    map.insert("DEALSCAN_MIN_INTERVAL_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCAN_MIN_INTERVAL_MS"),
        "expected InvalidEnvVar(DEALSCAN_MIN_INTERVAL_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_request_timeout_invalid() {
    let mut map = paapi_env();
    map.insert("DEALSCAN_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCAN_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(DEALSCAN_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_reads_affiliate_and_proxy_settings() {
    let mut map = paapi_env();
    map.insert("AFFILIATE_TAG", "mytag-21");
    map.insert("AFFILIATE_DOMAIN", "www.amazon.de");
    map.insert("PROXY_URL", "http://proxy.local:3128");
    map.insert("PAAPI_HOST", "webservices.amazon.de");
    map.insert("PAAPI_REGION", "eu-west-1");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.affiliate_tag.as_deref(), Some("mytag-21"));
    assert_eq!(cfg.affiliate_domain, "www.amazon.de");
    assert_eq!(cfg.proxy_url.as_deref(), Some("http://proxy.local:3128"));
    let paapi = cfg.paapi.unwrap();
    assert_eq!(paapi.host, "webservices.amazon.de");
    assert_eq!(paapi.region, "eu-west-1");
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = paapi_env();
    map.insert("KEEPA_API_KEY", "keepa-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("AKIDEXAMPLE"), "access key leaked: {rendered}");
    assert!(!rendered.contains("keepa-secret"), "keepa key leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn overrides_take_precedence_over_environment() {
    let overrides: HashMap<String, String> = [
        ("DEALSCAN_PROVIDER", "keepa"),
        ("DEALSCAN_OUTPUT_DIR", "/tmp/dealscan-override"),
        ("DEALSCAN_BATCH_SIZE", "25"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let config = load_app_config_with_overrides(&overrides).expect("keepa needs no credentials");
    assert_eq!(config.provider, ProviderKind::Keepa);
    assert_eq!(
        config.output_dir,
        std::path::PathBuf::from("/tmp/dealscan-override")
    );
    assert_eq!(config.effective_batch_size(), 25);
}
