use std::path::PathBuf;
use std::time::Duration;

/// Which catalog provider a run fetches prices from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Signature-authenticated product advertising API (POST, `SigV4` signed).
    Paapi,
    /// API-key authenticated price-history API (GET).
    Keepa,
}

impl ProviderKind {
    /// Largest number of identifiers the provider accepts in one request.
    #[must_use]
    pub fn max_batch_size(self) -> usize {
        match self {
            ProviderKind::Paapi => 10,
            ProviderKind::Keepa => 100,
        }
    }

    /// Minimum gap between the starts of two consecutive batch requests.
    #[must_use]
    pub fn default_min_interval_ms(self) -> u64 {
        match self {
            ProviderKind::Paapi => 1_000,
            ProviderKind::Keepa => 60_000,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Paapi => write!(f, "paapi"),
            ProviderKind::Keepa => write!(f, "keepa"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paapi" => Ok(ProviderKind::Paapi),
            "keepa" => Ok(ProviderKind::Keepa),
            other => Err(format!("unknown provider \"{other}\" (expected paapi or keepa)")),
        }
    }
}

/// Credentials and endpoint settings for the signed API.
#[derive(Clone)]
pub struct PaapiCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub partner_tag: String,
    pub host: String,
    pub region: String,
    pub marketplace: String,
}

impl std::fmt::Debug for PaapiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaapiCredentials")
            .field("access_key", &"[redacted]")
            .field("secret_key", &"[redacted]")
            .field("partner_tag", &self.partner_tag)
            .field("host", &self.host)
            .field("region", &self.region)
            .field("marketplace", &self.marketplace)
            .finish()
    }
}

/// Settings for the keyed API. A missing key is allowed: the client then
/// returns empty results instead of failing the run.
#[derive(Clone)]
pub struct KeepaSettings {
    pub api_key: Option<String>,
    pub domain: u8,
}

impl std::fmt::Debug for KeepaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepaSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("domain", &self.domain)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderKind,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Requested batch size; `None` means "use the provider maximum".
    pub batch_size: Option<usize>,
    /// Override for the provider's default inter-request interval.
    pub min_interval_ms: Option<u64>,
    /// Retries for the keyed GET call on transient failures.
    pub max_retries: u32,
    /// Present only when the `paapi` provider is selected.
    pub paapi: Option<PaapiCredentials>,
    pub keepa: KeepaSettings,
    pub affiliate_tag: Option<String>,
    pub affiliate_domain: String,
    pub proxy_url: Option<String>,
}

impl AppConfig {
    /// Batch size actually used: the requested size clamped to
    /// `1..=provider max`.
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        let max = self.provider.max_batch_size();
        self.batch_size.map_or(max, |n| n.clamp(1, max))
    }

    /// Minimum interval between the starts of consecutive batch requests.
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(
            self.min_interval_ms
                .unwrap_or_else(|| self.provider.default_min_interval_ms()),
        )
    }
}
