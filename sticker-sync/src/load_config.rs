/// `load_config` module: builds the run configuration from a YAML file or from the environment.
///
/// This module is the only place where untrusted configuration is parsed and mapped to the
/// strongly-typed structs of `sticker-sync-core`.
///
/// # Responsibilities
/// - Parse an optional YAML file (no secrets) into [`CliConfig`]
/// - Without a file, read the same settings from environment variables
/// - Fill in defaults for the API base URLs and the name policy
///
/// Secrets (`NOTION_TOKEN`, `STICKERTRADE_SESSION`) are never read here; the clients take
/// them from the environment when they are constructed.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use sticker_sync_core::config::{
    DestinationConfig, NamePolicy, SourceConfig, SyncConfig, DEFAULT_MAX_NAME_LENGTH,
};
use tracing::{error, info};

pub const DEFAULT_NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_STICKERTRADE_BASE_URL: &str = "https://stickertrade.ca";

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    pub source: SourceSection,
    pub destination: DestinationSection,
    #[serde(default)]
    pub policy: NamePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    #[serde(flatten)]
    pub database: SourceConfig,
    #[serde(default = "default_notion_api_base_url")]
    pub api_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationSection {
    #[serde(flatten)]
    pub account: DestinationConfig,
    #[serde(default = "default_stickertrade_base_url")]
    pub base_url: String,
}

fn default_notion_api_base_url() -> String {
    DEFAULT_NOTION_API_BASE_URL.to_string()
}

fn default_stickertrade_base_url() -> String {
    DEFAULT_STICKERTRADE_BASE_URL.to_string()
}

impl CliConfig {
    /// The core run configuration this CLI configuration describes.
    pub fn sync_config(&self, dry_run: bool) -> SyncConfig {
        SyncConfig {
            source: self.source.database.clone(),
            destination: self.destination.account.clone(),
            policy: self.policy.clone(),
            dry_run,
        }
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Builds the configuration from environment variables only.
pub fn load_config_from_env() -> Result<CliConfig> {
    info!("Loading configuration from environment");

    let database = SourceConfig {
        database_id: required_env("NOTION_DATABASE_ID")?,
        count_property_id: required_env("NOTION_COUNT_PROPERTY_ID")?,
        exclude_property_id: required_env("NOTION_EXCLUDE_PROPERTY_ID")?,
        title_property_id: optional_env("NOTION_TITLE_PROPERTY_ID")
            .unwrap_or_else(|| "title".to_string()),
    };
    let account = DestinationConfig {
        username: required_env("STICKERTRADE_USERNAME")?,
    };
    let policy = match optional_env("STICKER_MAX_NAME_LENGTH") {
        Some(raw) => NamePolicy {
            max_name_length: parse_max_name_length(&raw)?,
        },
        None => NamePolicy::default(),
    };

    let config = CliConfig {
        source: SourceSection {
            database,
            api_base_url: optional_env("NOTION_API_BASE_URL")
                .unwrap_or_else(default_notion_api_base_url),
        },
        destination: DestinationSection {
            account,
            base_url: optional_env("STICKERTRADE_BASE_URL")
                .unwrap_or_else(default_stickertrade_base_url),
        },
        policy,
    };
    info!(
        database_id = %config.source.database.database_id,
        username = %config.destination.account.username,
        "Config loaded from environment"
    );
    Ok(config)
}

/// `none`/`off` disables the limit; anything else must be a positive integer.
fn parse_max_name_length(raw: &str) -> Result<Option<usize>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "none" | "off" => Ok(None),
        value => match value.parse::<usize>() {
            Ok(0) | Err(_) => {
                error!(raw, "STICKER_MAX_NAME_LENGTH must be a positive integer or 'none'");
                Err(anyhow::anyhow!(
                    "STICKER_MAX_NAME_LENGTH must be a positive integer or 'none' (default {DEFAULT_MAX_NAME_LENGTH}), got {raw:?}"
                ))
            }
            Ok(n) => Ok(Some(n)),
        },
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => {
            error!(var = name, "Environment variable is empty");
            Err(anyhow::anyhow!("{name} environment variable is empty"))
        }
        Err(e) => {
            error!(error = ?e, var = name, "Environment variable not set");
            Err(anyhow::anyhow!("{name} environment variable not set: {e}"))
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
