// --- File: crates/roomify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via ROOMIFY_DATABASE__URL
}

// --- Booking policy ---
// Windows are expressed in minutes so they read the same in config files
// and in the service layer.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// Minimum reservation length in minutes.
    #[serde(default = "default_min_duration_minutes")]
    pub min_duration_minutes: i64,
    /// How long before start time check-in opens, in minutes.
    #[serde(default = "default_check_in_lead_minutes")]
    pub check_in_lead_minutes: i64,
    /// Grace period after start time before a missed check-in is
    /// auto-cancelled, in minutes.
    #[serde(default = "default_missed_check_in_grace_minutes")]
    pub missed_check_in_grace_minutes: i64,
}

fn default_min_duration_minutes() -> i64 {
    30
}

fn default_check_in_lead_minutes() -> i64 {
    15
}

fn default_missed_check_in_grace_minutes() -> i64 {
    30
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: default_min_duration_minutes(),
            check_in_lead_minutes: default_check_in_lead_minutes(),
            missed_check_in_grace_minutes: default_missed_check_in_grace_minutes(),
        }
    }
}

// --- Scheduler Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulerConfig {
    /// Seconds between consistency sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: Option<DatabaseConfig>, // Central DB config
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}
