use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

/// Minor-unit amount at or above which confirming a settlement requires
/// step-up verification. The reference policy is 500000 paisa.
const DEFAULT_STEP_UP_THRESHOLD: i64 = 500_000;

#[derive(Debug)]
pub struct Config {
    pub step_up_threshold: i64,
    pub log_level: String,
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            step_up_threshold: env::var("STEP_UP_VERIFICATION_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STEP_UP_THRESHOLD),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

// Global static accessible everywhere
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// Policy knobs for the settlement lifecycle. Injected into the service
/// so deployments can tune thresholds without going through the process
/// environment.
#[derive(Clone, Copy, Debug)]
pub struct SettlementPolicy {
    pub step_up_threshold: i64,
}

impl SettlementPolicy {
    pub fn new(step_up_threshold: i64) -> Self {
        SettlementPolicy { step_up_threshold }
    }
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        SettlementPolicy {
            step_up_threshold: CONFIG.step_up_threshold,
        }
    }
}
