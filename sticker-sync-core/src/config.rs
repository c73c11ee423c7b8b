use serde::Deserialize;
use tracing::{debug, info};

/// Longest sticker name stickertrade accepts.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 60;

/// Everything a single synchronisation run needs, minus credentials.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    pub policy: NamePolicy,
    /// Stop after validation; nothing is downloaded or uploaded.
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn trace_loaded(&self) {
        info!(
            database_id = %self.source.database_id,
            username = %self.destination.username,
            max_name_length = ?self.policy.max_name_length,
            dry_run = self.dry_run,
            "Loaded SyncConfig"
        );
        debug!(config = ?self, "SyncConfig loaded (full debug)");
    }
}

/// Where the stickers live in Notion and which properties hold what.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub database_id: String,
    pub count_property_id: String,
    pub exclude_property_id: String,
    #[serde(default = "default_title_property_id")]
    pub title_property_id: String,
}

fn default_title_property_id() -> String {
    "title".to_string()
}

/// The stickertrade account the stickers are published to.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    pub username: String,
}

/// Limits applied to sticker names before upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamePolicy {
    /// Maximum name length in characters; `None` disables the check.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: Option<usize>,
}

fn default_max_name_length() -> Option<usize> {
    Some(DEFAULT_MAX_NAME_LENGTH)
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
        }
    }
}

impl NamePolicy {
    pub fn unlimited() -> Self {
        Self {
            max_name_length: None,
        }
    }
}
