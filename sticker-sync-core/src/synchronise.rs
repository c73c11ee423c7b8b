//! High-level pipeline: destination catalog → source records → validation → upload.
//!
//! A run moves through [`SyncState`] strictly forward:
//!   - `ReadingCatalog`: read the destination profile into a [`DestinationNameSet`]
//!   - `FetchingAndValidating`: page through the source database, validating each
//!     record as its page arrives
//!   - `Uploading`: download and create every accepted sticker, in acceptance order
//!   - `Done`
//!
//! # Error Handling
//! Fail-fast: the first fatal [`SyncError`] ends the run. Uploading only starts once
//! every record validated, so a schema problem anywhere means nothing is uploaded.
//! There are no checkpoints; a re-run starts over from the catalog read and skips
//! whatever the destination lists by then.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Output: [`SynchroniseReport`]

use std::fmt;

use futures::{pin_mut, TryStreamExt};
use tracing::{debug, error, info};

use crate::catalog::{read_destination_names, DestinationNameSet};
use crate::config::SyncConfig;
use crate::contract::{CatalogReader, SourceDatabase, Uploader};
use crate::error::SyncError;
use crate::fetch::record_pages;
use crate::upload::{upload_record, UploadedSticker};
use crate::validate::{validate_record, NormalizedRecord, SkipReason, Validation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    ReadingCatalog,
    FetchingAndValidating,
    Uploading,
    Done,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncState::ReadingCatalog => "reading catalog",
            SyncState::FetchingAndValidating => "fetching and validating",
            SyncState::Uploading => "uploading",
            SyncState::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub name: String,
    pub reason: SkipReason,
}

/// What a completed run did.
#[derive(Debug, Clone, Default)]
pub struct SynchroniseReport {
    /// Names already on the destination when the run started.
    pub already_published: usize,
    /// Source records read and validated.
    pub scanned: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Records that passed validation, in acceptance order.
    pub accepted: Vec<NormalizedRecord>,
    pub uploaded: Vec<UploadedSticker>,
    pub dry_run: bool,
}

impl SynchroniseReport {
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Run one full synchronisation with the given clients.
pub async fn synchronise<S, C, U>(
    config: &SyncConfig,
    source: &S,
    catalog: &C,
    uploader: &U,
) -> Result<SynchroniseReport, SyncError>
where
    S: SourceDatabase + ?Sized,
    C: CatalogReader + ?Sized,
    U: Uploader + ?Sized,
{
    info!("[SYNC] Starting sticker synchronisation");
    let mut report = SynchroniseReport {
        dry_run: config.dry_run,
        ..SynchroniseReport::default()
    };

    enter(SyncState::ReadingCatalog);
    let existing = read_destination_names(catalog, &config.destination.username).await?;
    report.already_published = existing.len();

    enter(SyncState::FetchingAndValidating);
    validate_all(config, source, &existing, &mut report).await?;
    info!(
        scanned = report.scanned,
        accepted = report.accepted.len(),
        skipped = report.skipped.len(),
        "[SYNC] Validation finished"
    );

    if report.accepted.is_empty() {
        info!("[SYNC] Nothing to upload");
        enter(SyncState::Done);
        return Ok(report);
    }

    if config.dry_run {
        for record in &report.accepted {
            info!(name = %record.name, count = record.remaining_count, "[SYNC][DRY RUN] Would upload");
        }
        enter(SyncState::Done);
        return Ok(report);
    }

    enter(SyncState::Uploading);
    let total = report.accepted.len();
    for (index, record) in report.accepted.iter().enumerate() {
        let uploaded = upload_record(uploader, record).await?;
        info!(
            name = %uploaded.name,
            filename = %uploaded.filename,
            position = index + 1,
            total,
            "[SYNC][UPLOAD] Sticker created"
        );
        report.uploaded.push(uploaded);
    }

    enter(SyncState::Done);
    info!(uploaded = report.uploaded.len(), "[SYNC] Synchronisation complete");
    Ok(report)
}

async fn validate_all<S>(
    config: &SyncConfig,
    source: &S,
    existing: &DestinationNameSet,
    report: &mut SynchroniseReport,
) -> Result<(), SyncError>
where
    S: SourceDatabase + ?Sized,
{
    let pages = record_pages(source, &config.source.database_id);
    pin_mut!(pages);

    let mut page_number = 0usize;
    while let Some(page) = pages.try_next().await? {
        page_number += 1;
        debug!(page = page_number, records = page.len(), "[SYNC] Validating page");
        for record in &page {
            let outcome = validate_record(source, &config.source, &config.policy, existing, record)
                .await
                .map_err(|e| {
                    error!(error = %e, record_id = %record.id, "[SYNC][ERROR] Validation failed");
                    e
                })?;
            report.scanned += 1;
            match outcome {
                Validation::Accepted(normalized) => report.accepted.push(normalized),
                Validation::Skipped { name, reason } => {
                    report.skipped.push(SkippedRecord { name, reason })
                }
            }
        }
        info!(
            page = page_number,
            validated = report.scanned,
            accepted = report.accepted.len(),
            "[SYNC] Progress"
        );
    }
    Ok(())
}

fn enter(state: SyncState) {
    info!(state = %state, "[SYNC] Entering state");
}
