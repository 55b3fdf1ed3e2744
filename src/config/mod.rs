use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Raydium AMM v4 program, the monitored program.
pub const RAYDIUM_AMM_PROGRAM: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
/// Raydium AMM authority.
pub const RAYDIUM_AUTHORITY: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";

/// Addresses conventionally used as burn sinks.
pub const BURN_ADDRESSES: [&str; 5] = [
    "1111111111111111111111111111111111111111111",
    "11111111111111111111111111111111",
    "So11111111111111111111111111111111111111112",
    "burnSoL11111111111111111111111111111111111",
    "DeadSo11111111111111111111111111111111111",
];

/// Public endpoints tried after the configured one.
pub const FALLBACK_RPC_URLS: [&str; 3] = [
    "https://api.mainnet-beta.solana.com",
    "https://solana-mainnet.public.blastapi.io",
    "https://rpc.ankr.com/solana",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required env var: {0}")]
    MissingEnv(String),
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub solana: SolanaConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token - loaded from env TELEGRAM_BOT_TOKEN
    #[serde(default)]
    pub bot_token: String,
    /// Channel id or @handle - loaded from env TELEGRAM_CHANNEL_ID
    #[serde(default)]
    pub channel_id: String,
    /// Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaConfig {
    /// RPC endpoints in rotation order. The first entry comes from SOLANA_RPC_URL.
    #[serde(default = "default_rpc_urls")]
    pub rpc_urls: Vec<String>,
    /// Program whose signatures are polled.
    #[serde(default = "default_program_id")]
    pub program_id: String,
    /// Authority account that also marks a transaction as touching the pool.
    #[serde(default = "default_authority_id")]
    pub authority_id: String,
    #[serde(default = "default_burn_addresses")]
    pub burn_addresses: Vec<String>,
    /// Max signatures fetched per cycle.
    #[serde(default = "default_signature_limit")]
    pub signature_limit: usize,
    /// Delay before each getTransaction call.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Base sleep between cycles, in seconds.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// Burn percentage reported for every detected burn.
    #[serde(default = "default_min_burn_percent")]
    pub min_burn_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Hard cap on remembered signatures.
    #[serde(default = "default_ledger_capacity")]
    pub capacity: usize,
    /// Entries kept after an eviction.
    #[serde(default = "default_ledger_retain")]
    pub retain: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    /// Token info endpoint; the mint address is appended as a path segment.
    #[serde(default = "default_metadata_url")]
    pub url: String,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_rpc_urls() -> Vec<String> {
    FALLBACK_RPC_URLS.iter().map(|s| s.to_string()).collect()
}
fn default_program_id() -> String {
    RAYDIUM_AMM_PROGRAM.to_string()
}
fn default_authority_id() -> String {
    RAYDIUM_AUTHORITY.to_string()
}
fn default_burn_addresses() -> Vec<String> {
    BURN_ADDRESSES.iter().map(|s| s.to_string()).collect()
}
fn default_signature_limit() -> usize {
    10
}
fn default_request_delay_ms() -> u64 {
    250
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_check_interval() -> u64 {
    30
}
fn default_min_burn_percent() -> f64 {
    90.0
}
fn default_ledger_capacity() -> usize {
    10_000
}
fn default_ledger_retain() -> usize {
    5_000
}
fn default_metadata_url() -> String {
    "https://price.jup.ag/v4/token".to_string()
}
fn default_metadata_timeout() -> u64 {
    5
}
fn default_health_port() -> u16 {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_url: default_telegram_api_url(),
        }
    }
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            rpc_urls: default_rpc_urls(),
            program_id: default_program_id(),
            authority_id: default_authority_id(),
            burn_addresses: default_burn_addresses(),
            signature_limit: default_signature_limit(),
            request_delay_ms: default_request_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            min_burn_percent: default_min_burn_percent(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: default_ledger_capacity(),
            retain: default_ledger_retain(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            url: default_metadata_url(),
            timeout_secs: default_metadata_timeout(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            port: default_health_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Defaults plus environment variables (no file needed).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Overlay variables from `lookup` onto this config. Secrets are never
    /// expected in the file, so they always come from here.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(channel) = lookup("TELEGRAM_CHANNEL_ID") {
            self.telegram.channel_id = channel;
        }
        if let Some(url) = lookup("SOLANA_RPC_URL") {
            self.solana.rpc_urls.insert(0, url);
        }
        if let Some(v) = lookup("CHECK_INTERVAL") {
            self.monitor.check_interval_secs = parse_var("CHECK_INTERVAL", &v)?;
        }
        if let Some(v) = lookup("MIN_BURN_PERCENT") {
            self.monitor.min_burn_percent = parse_var("MIN_BURN_PERCENT", &v)?;
        }
        if let Some(v) = lookup("PORT") {
            self.health.port = parse_var("PORT", &v)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        // Primary first, drop empties and repeats.
        let mut urls: Vec<String> = Vec::with_capacity(self.solana.rpc_urls.len());
        for url in self.solana.rpc_urls.drain(..) {
            let url = url.trim().to_string();
            if !url.is_empty() && !urls.contains(&url) {
                urls.push(url);
            }
        }
        self.solana.rpc_urls = urls;
        Ok(())
    }

    /// Check that everything needed to run is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::MissingEnv("TELEGRAM_BOT_TOKEN".to_string()));
        }
        if self.telegram.channel_id.is_empty() {
            return Err(ConfigError::MissingEnv("TELEGRAM_CHANNEL_ID".to_string()));
        }
        if self.solana.rpc_urls.is_empty() {
            return Err(ConfigError::MissingEnv("SOLANA_RPC_URL".to_string()));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.check_interval_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.solana.request_delay_ms)
    }

    /// Bot token with everything but the last 10 characters hidden.
    pub fn masked_token(&self) -> String {
        let token = &self.telegram.bot_token;
        let visible: String = token
            .chars()
            .rev()
            .take(10)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("{}{}", "*".repeat(10), visible)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.monitor.check_interval_secs, 30);
        assert_eq!(config.monitor.min_burn_percent, 90.0);
        assert_eq!(config.health.port, 10_000);
        assert_eq!(config.ledger.capacity, 10_000);
        assert_eq!(config.ledger.retain, 5_000);
        assert_eq!(config.solana.signature_limit, 10);
        assert_eq!(config.solana.burn_addresses.len(), BURN_ADDRESSES.len());
    }

    #[test]
    fn test_env_overlay() {
        let vars = env(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHANNEL_ID", "@burns"),
            ("SOLANA_RPC_URL", "https://my-node.example"),
            ("CHECK_INTERVAL", "12"),
            ("MIN_BURN_PERCENT", "95.5"),
            ("PORT", "8080"),
        ]);
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.telegram.channel_id, "@burns");
        assert_eq!(config.solana.rpc_urls[0], "https://my-node.example");
        assert_eq!(config.solana.rpc_urls.len(), FALLBACK_RPC_URLS.len() + 1);
        assert_eq!(config.monitor.check_interval_secs, 12);
        assert_eq!(config.monitor.min_burn_percent, 95.5);
        assert_eq!(config.health.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_primary_url_deduplicated() {
        let vars = env(&[("SOLANA_RPC_URL", FALLBACK_RPC_URLS[1])]);
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.solana.rpc_urls[0], FALLBACK_RPC_URLS[1]);
        assert_eq!(config.solana.rpc_urls.len(), FALLBACK_RPC_URLS.len());
    }

    #[test]
    fn test_missing_secrets_rejected() {
        let config = Config::default();
        match config.validate() {
            Err(ConfigError::MissingEnv(name)) => assert_eq!(name, "TELEGRAM_BOT_TOKEN"),
            other => panic!("unexpected: {:?}", other),
        }

        let vars = env(&[("TELEGRAM_BOT_TOKEN", "123:abc")]);
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).cloned()).unwrap();
        match config.validate() {
            Err(ConfigError::MissingEnv(name)) => assert_eq!(name, "TELEGRAM_CHANNEL_ID"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number_rejected() {
        let vars = env(&[("CHECK_INTERVAL", "soon")]);
        let mut config = Config::default();
        let err = config.apply_env(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_toml_sections() {
        let config: Config = toml::from_str(
            r#"
            [solana]
            rpc_urls = ["https://a.example", "https://b.example"]
            signature_limit = 25

            [monitor]
            check_interval_secs = 5

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.solana.rpc_urls.len(), 2);
        assert_eq!(config.solana.signature_limit, 25);
        assert_eq!(config.solana.program_id, RAYDIUM_AMM_PROGRAM);
        assert_eq!(config.monitor.check_interval_secs, 5);
        assert_eq!(config.monitor.min_burn_percent, 90.0);
        assert!(config.logging.json);
    }

    #[test]
    fn test_masked_token() {
        let mut config = Config::default();
        config.telegram.bot_token = "123456:ABCDEFGHIJKLMNOP".to_string();
        assert_eq!(config.masked_token(), "**********GHIJKLMNOP");
    }
}
