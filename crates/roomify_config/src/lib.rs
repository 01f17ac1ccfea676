use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
pub mod models;
pub use models::*;

/// Loads the layered application configuration.
///
/// Sources, later entries overriding earlier ones:
/// 1. `config/default` (any format the `config` crate understands)
/// 2. `config/{RUN_ENV}` (defaults to `debug`)
/// 3. environment variables prefixed `ROOMIFY`, nested with `__`
///    (e.g. `ROOMIFY_DATABASE__URL`)
///
/// Both file sources are optional so a bare environment works out of the
/// box with the serde defaults in [`models`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(Environment::with_prefix("ROOMIFY").separator("__"));

    builder.build()?.try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// Guarded by a `OnceCell` so repeated calls (the config is loaded by both
/// the binary and tests) only read the file once. `DOTENV_OVERRIDE` selects
/// an alternative file; a missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = std::env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_deserializes_with_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.database.is_none());
        assert_eq!(config.booking.min_duration_minutes, 30);
        assert_eq!(config.booking.check_in_lead_minutes, 15);
        assert_eq!(config.booking.missed_check_in_grace_minutes, 30);
        assert_eq!(config.scheduler.sweep_interval_secs, 300);
    }

    #[test]
    fn booking_section_overrides_apply() {
        let config: AppConfig = Config::builder()
            .set_override("booking.min_duration_minutes", 60i64)
            .unwrap()
            .set_override("scheduler.sweep_interval_secs", 30i64)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.booking.min_duration_minutes, 60);
        // Untouched fields keep their defaults.
        assert_eq!(config.booking.check_in_lead_minutes, 15);
        assert_eq!(config.scheduler.sweep_interval_secs, 30);
    }
}
