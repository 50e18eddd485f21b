use pennybook_core::fx::ResolverThresholds;

/// Server configuration, read once from the environment at startup.
pub struct Config {
    pub listen_addr: String,
    /// Directory holding the SQLite database file.
    pub data_dir: String,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub resolver_thresholds: ResolverThresholds,
    pub idempotency_ttl_hours: i64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = ResolverThresholds::default();
        Self {
            listen_addr: std::env::var("PB_LISTEN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8425".to_string()),
            data_dir: std::env::var("PB_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            rate_limit_per_second: env_parse("PB_RATE_LIMIT_PER_SECOND", 20),
            rate_limit_burst: env_parse("PB_RATE_LIMIT_BURST", 40),
            resolver_thresholds: ResolverThresholds {
                recent_days: env_parse("PB_FX_RECENT_DAYS", defaults.recent_days),
                outdated_days: env_parse("PB_FX_OUTDATED_DAYS", defaults.outdated_days),
                lookback_days: env_parse("PB_FX_LOOKBACK_DAYS", defaults.lookback_days),
            },
            idempotency_ttl_hours: env_parse("PB_IDEMPOTENCY_TTL_HOURS", 24),
        }
    }
}
