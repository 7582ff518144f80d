use crate::auth::JwtConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Shipping and tax policy. These are business parameters, not
/// correctness concerns; totals stay deterministic for any given policy.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    /// Orders strictly above this items total ship free
    pub free_shipping_threshold: f64,
    /// Flat shipping fee below the threshold
    pub shipping_fee: f64,
    /// Tax percentage applied to the items total
    pub tax_rate_percent: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 100.0,
            shipping_fee: 10.0,
            tax_rate_percent: 15.0,
        }
    }
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/store-server | work directory (database, logs) |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | DB_TIMEOUT_MS | 5000 | per-call database timeout |
/// | FREE_SHIPPING_THRESHOLD | 100 | items total above which shipping is free |
/// | SHIPPING_FEE | 10 | flat shipping fee |
/// | TAX_RATE_PERCENT | 15 | tax percentage on the items total |
/// | JWT_SECRET | (generated in dev) | token signing secret |
/// | JWT_EXPIRATION_MINUTES | 43200 | token lifetime |
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory for the database and log files
    pub work_dir: String,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Per-call database timeout (milliseconds)
    pub db_timeout_ms: u64,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Shipping/tax policy
    pub pricing: PricingPolicy,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/store-server".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            db_timeout_ms: std::env::var("DB_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            jwt: JwtConfig::default(),
            pricing: PricingPolicy {
                free_shipping_threshold: std::env::var("FREE_SHIPPING_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100.0),
                shipping_fee: std::env::var("SHIPPING_FEE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10.0),
                tax_rate_percent: std::env::var("TAX_RATE_PERCENT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15.0),
            },
        }
    }

    /// Override the work directory, for tests
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    /// Database directory under the work dir
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Per-call database timeout
    pub fn db_timeout(&self) -> Duration {
        Duration::from_millis(self.db_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
