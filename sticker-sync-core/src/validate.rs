//! Record validator/normalizer.
//!
//! Turns one [`RawRecord`] into a [`NormalizedRecord`], a skip, or a fatal
//! [`SyncError`]. Fields are retrieved one at a time in a fixed order: title,
//! count, exclude flag, first block. A record stops being read as soon as it is
//! skipped, so the order decides which message a user sees, never which records
//! are accepted.

use std::fmt;

use tracing::{debug, error, info};

use crate::catalog::DestinationNameSet;
use crate::config::{NamePolicy, SourceConfig};
use crate::contract::{Block, PropertyValue, RawRecord, SourceDatabase};
use crate::error::SyncError;

/// A record that passed every gate and is ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub name: String,
    pub remaining_count: u64,
    pub excluded: bool,
    pub image_url: String,
}

/// Why a record is left out of the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination already lists a sticker with this name.
    AlreadySynced,
    /// No stickers left to trade.
    NoneRemaining,
    /// Explicitly excluded in the source database.
    Excluded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadySynced => write!(f, "it's already in stickertrade"),
            SkipReason::NoneRemaining => write!(f, "it has no stickers remaining"),
            SkipReason::Excluded => write!(f, "it's excluded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted(NormalizedRecord),
    Skipped { name: String, reason: SkipReason },
}

/// Validate one record against the source schema and the destination catalog.
pub async fn validate_record<S>(
    source: &S,
    config: &SourceConfig,
    policy: &NamePolicy,
    existing: &DestinationNameSet,
    record: &RawRecord,
) -> Result<Validation, SyncError>
where
    S: SourceDatabase + ?Sized,
{
    let record_id = record.id.as_str();

    let name = match retrieve(source, record_id, &config.title_property_id, "title").await? {
        PropertyValue::Title(segments) => segments.concat(),
        other => return Err(unexpected(record_id, "title", "title", &other)),
    };
    if name.is_empty() {
        error!(record_id, "Record has an empty title");
        return Err(SyncError::EmptyTitle {
            record_id: record_id.to_string(),
        });
    }

    if existing.contains(&name) {
        return Ok(skip(name, SkipReason::AlreadySynced));
    }

    check_name_length(&name, policy)?;

    let remaining_count =
        match retrieve(source, record_id, &config.count_property_id, "count").await? {
            PropertyValue::Number(value) => whole_count(&name, value)?,
            other => return Err(unexpected(record_id, "count", "number", &other)),
        };
    if remaining_count == 0 {
        return Ok(skip(name, SkipReason::NoneRemaining));
    }

    let excluded =
        match retrieve(source, record_id, &config.exclude_property_id, "exclude").await? {
            PropertyValue::Checkbox(checked) => checked,
            other => return Err(unexpected(record_id, "exclude", "checkbox", &other)),
        };
    if excluded {
        return Ok(skip(name, SkipReason::Excluded));
    }

    let block = source
        .first_block(record_id)
        .await
        .map_err(|e| SyncError::Retrieve {
            record_id: record_id.to_string(),
            field: "first block",
            source: e,
        })?;
    let image_url = match block {
        Some(Block::HostedImage { url }) => url,
        Some(Block::ExternalImage { .. }) => {
            return Err(SyncError::ExternalImage {
                record_id: record_id.to_string(),
                name,
            })
        }
        Some(Block::Other { kind }) => {
            return Err(SyncError::NotAnImage {
                record_id: record_id.to_string(),
                name,
                found: kind,
            })
        }
        None => {
            return Err(SyncError::MissingImage {
                record_id: record_id.to_string(),
                name,
            })
        }
    };

    debug!(record_id, name = %name, remaining_count, "Record accepted");
    Ok(Validation::Accepted(NormalizedRecord {
        name,
        remaining_count,
        excluded,
        image_url,
    }))
}

/// Fails when `name` is longer than the policy allows. Length counts characters.
pub fn check_name_length(name: &str, policy: &NamePolicy) -> Result<(), SyncError> {
    let Some(max) = policy.max_name_length else {
        return Ok(());
    };
    let length = name.chars().count();
    if length > max {
        error!(name, length, max, "Sticker name is too long for the destination");
        return Err(SyncError::NameTooLong {
            name: name.to_string(),
            length,
            max,
        });
    }
    Ok(())
}

fn whole_count(name: &str, value: Option<f64>) -> Result<u64, SyncError> {
    match value {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => Ok(n as u64),
        Some(n) => Err(SyncError::InvalidCount {
            name: name.to_string(),
            found: n.to_string(),
        }),
        None => Err(SyncError::InvalidCount {
            name: name.to_string(),
            found: "empty".to_string(),
        }),
    }
}

async fn retrieve<S>(
    source: &S,
    record_id: &str,
    property_id: &str,
    field: &'static str,
) -> Result<PropertyValue, SyncError>
where
    S: SourceDatabase + ?Sized,
{
    source
        .retrieve_property(record_id, property_id)
        .await
        .map_err(|e| {
            error!(error = %e, record_id, property_id, field, "Failed to retrieve property");
            SyncError::Retrieve {
                record_id: record_id.to_string(),
                field,
                source: e,
            }
        })
}

fn unexpected(
    record_id: &str,
    field: &'static str,
    expected: &'static str,
    found: &PropertyValue,
) -> SyncError {
    error!(record_id, field, expected, found = found.kind(), "Unexpected property kind");
    SyncError::UnexpectedProperty {
        record_id: record_id.to_string(),
        field,
        expected,
        found: found.kind().to_string(),
    }
}

fn skip(name: String, reason: SkipReason) -> Validation {
    info!(name = %name, %reason, "Skipping {} because {}", name, reason);
    Validation::Skipped { name, reason }
}
