//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod messages;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::database::{DatabaseConfig, ReferencePolicy};
pub use self::logging::LoggingConfig;
pub use self::messages::{MessageCatalog, ServiceOperation};
pub use self::worker::{ImportJobConfig, PurgeJobConfig, WorkerConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Background job settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Service and job message templates.
    #[serde(default)]
    pub messages: MessageCatalog,
}

impl AppConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Sources are merged in order: `config/default.toml`, `config/{env}.toml`,
    /// and environment variables prefixed with `ROSTER__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ROSTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_source() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.reference_policy, ReferencePolicy::AllowNull);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.worker.purge.interval_minutes, 5);
        assert_eq!(config.worker.purge.age_threshold, 30);
        assert_eq!(config.worker.import.file_path, "data/countries.csv");
        assert!(config.worker.import.start_at.is_none());
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [database]
            url = "sqlite::memory:"
            reference_policy = "require"

            [worker.purge]
            interval_minutes = 1

            [messages.service]
            "add.User" = "Could not register {entity}."
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.reference_policy, ReferencePolicy::Require);
        assert_eq!(config.worker.purge.interval_minutes, 1);
        assert_eq!(config.worker.purge.age_threshold, 30);
        assert_eq!(
            config.messages.render(ServiceOperation::Add, "User", &[]),
            "Could not register User."
        );
    }
}
