use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Freigabe
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FreigabeConfig {
    /// Database settings
    pub database: DatabaseConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Identity of the operator running this CLI session
    pub identity: IdentityConfig,
    /// Workflow tuning
    pub workflow: WorkflowSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file path or connection string
    pub url: String,
    /// Enable automatic migrations on connect
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable tracing output
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Stable actor identity (uuid); required for any mutating command
    pub actor_id: Option<String>,
    /// Display name shown in history entries
    pub actor_name: String,
    /// Role string, e.g. "vertrieb", "supply_chain", "planung_storkow"
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowSettings {
    /// Capacity of the live history feed
    pub feed_capacity: usize,
    /// Dispatch outbound notifications
    pub notifications_enabled: bool,
}

impl Default for FreigabeConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: ".freigabe/freigabe.db".to_string(),
                auto_migrate: true,
            },
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
            },
            identity: IdentityConfig {
                actor_id: None, // Must be set via config file or env var
                actor_name: "unknown".to_string(),
                role: "vertrieb".to_string(),
            },
            workflow: WorkflowSettings {
                feed_capacity: 256,
                notifications_enabled: true,
            },
        }
    }
}

impl FreigabeConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (freigabe.toml, .freigabe-rc)
    /// 3. Environment variables (prefixed with FREIGABE__)
    pub fn load() -> Result<Self> {
        let defaults = FreigabeConfig::default();
        let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);

        if Path::new("freigabe.toml").exists() {
            builder = builder.add_source(File::with_name("freigabe"));
        }

        if Path::new(".freigabe-rc").exists() {
            builder = builder.add_source(File::with_name(".freigabe-rc"));
        }

        builder = builder.add_source(
            Environment::with_prefix("FREIGABE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut freigabe_config: FreigabeConfig = config.try_deserialize()?;

        // Actor identity may also come from the plain env var
        if freigabe_config.identity.actor_id.is_none() {
            if let Ok(actor_id) = std::env::var("FREIGABE_ACTOR_ID") {
                freigabe_config.identity.actor_id = Some(actor_id);
            }
        }

        Ok(freigabe_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<FreigabeConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = FreigabeConfig::load_env_file();
        FreigabeConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static FreigabeConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
