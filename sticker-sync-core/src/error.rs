//! Fatal errors of a synchronisation run.
//!
//! Skips are not errors; see [`crate::validate::SkipReason`].

use crate::contract::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to read destination catalog for {username}: {source}")]
    Catalog {
        username: String,
        source: ClientError,
    },

    #[error("failed to query source database {database_id}: {source}")]
    Query {
        database_id: String,
        source: ClientError,
    },

    #[error("failed to retrieve {field} of record {record_id}: {source}")]
    Retrieve {
        record_id: String,
        field: &'static str,
        source: ClientError,
    },

    #[error("{field} of record {record_id} is not a {expected} property (found {found})")]
    UnexpectedProperty {
        record_id: String,
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("title of record {record_id} is empty")]
    EmptyTitle { record_id: String },

    #[error("name {name:?} is {length} characters long, the destination accepts at most {max}")]
    NameTooLong {
        name: String,
        length: usize,
        max: usize,
    },

    #[error("count of {name:?} must be a whole non-negative number, found {found}")]
    InvalidCount { name: String, found: String },

    #[error("record {record_id} ({name:?}) has no content blocks, expected an image")]
    MissingImage { record_id: String, name: String },

    #[error("first block of record {record_id} ({name:?}) is not an image (found {found})")]
    NotAnImage {
        record_id: String,
        name: String,
        found: String,
    },

    #[error("image of record {record_id} ({name:?}) is external, expected an uploaded file")]
    ExternalImage { record_id: String, name: String },

    #[error("failed to download image for {name:?} from {url}: {source}")]
    ImageDownload {
        name: String,
        url: String,
        source: ClientError,
    },

    #[error("failed to create sticker {name:?}: {source}")]
    Upload { name: String, source: ClientError },
}
