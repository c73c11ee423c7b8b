#![allow(unused)]

//! # contract: the seams between the pipeline and the outside world
//!
//! Three traits, one per external collaborator:
//! - [`SourceDatabase`]: the Notion database holding sticker records.
//! - [`CatalogReader`]: the public stickertrade profile listing published stickers.
//! - [`Uploader`]: image download plus sticker creation on stickertrade.
//!
//! All methods are async and return a boxed [`ClientError`]; the pipeline decides
//! which failures are fatal. Responses are already decoded into the tagged unions
//! below ([`PropertyValue`], [`Block`]) so every call site matches exhaustively.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; mocks are exported with the
//!   `test-export-mocks` feature so integration tests can drive the pipeline.

use async_trait::async_trait;

use mockall::{automock, predicate::*};

/// Error type crossing the client seams (transport, HTTP status, decoding).
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// Opaque handle to one entry of the source database (the Notion page id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRecord {
    pub id: String,
}

impl RawRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One page of the database listing.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<RawRecord>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// A property value as retrieved for one record.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Title property; one plain-text string per rich text segment.
    Title(Vec<String>),
    /// Number property; `None` when the cell is empty.
    Number(Option<f64>),
    Checkbox(bool),
    /// Any property kind the pipeline does not read.
    Other { kind: String },
}

impl PropertyValue {
    /// Kind name as reported by the source, used in error messages.
    pub fn kind(&self) -> &str {
        match self {
            PropertyValue::Title(_) => "title",
            PropertyValue::Number(_) => "number",
            PropertyValue::Checkbox(_) => "checkbox",
            PropertyValue::Other { kind } => kind,
        }
    }
}

/// First content block of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Image uploaded to and served by the source itself.
    HostedImage { url: String },
    /// Image embedded from a third-party URL.
    ExternalImage { url: String },
    Other { kind: String },
}

impl Block {
    pub fn kind(&self) -> &str {
        match self {
            Block::HostedImage { .. } => "image (file)",
            Block::ExternalImage { .. } => "image (external)",
            Block::Other { kind } => kind,
        }
    }
}

/// A sticker as listed on a stickertrade profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSticker {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

/// The public profile of a stickertrade account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationProfile {
    pub username: String,
    pub avatar_url: Option<String>,
    pub stickers: Vec<CatalogSticker>,
}

/// Creation request for one sticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSticker {
    /// Name shown on the destination.
    pub name: String,
    /// Filename of the binary image part.
    pub filename: String,
    pub image: Vec<u8>,
}

/// Read access to the Notion sticker database.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceDatabase: Send + Sync {
    /// Query one page of the database, starting at `cursor` (or the beginning).
    async fn query_records(
        &self,
        database_id: &str,
        cursor: Option<String>,
    ) -> Result<RecordPage, ClientError>;

    /// Retrieve one property of one record.
    async fn retrieve_property(
        &self,
        record_id: &str,
        property_id: &str,
    ) -> Result<PropertyValue, ClientError>;

    /// Retrieve the first content block of a record, if it has any.
    async fn first_block(&self, record_id: &str) -> Result<Option<Block>, ClientError>;
}

/// Read access to the destination catalog.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Read the public profile of `username`, including its stickers.
    async fn fetch_profile(&self, username: &str) -> Result<DestinationProfile, ClientError>;
}

/// Transfers sticker images to the destination.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Download the image at `url` into memory.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ClientError>;

    /// Create a sticker on the destination.
    ///
    /// Implementors must return an error for any non-success response, with the
    /// response body in the message.
    async fn create_sticker(&self, sticker: NewSticker) -> Result<(), ClientError>;
}
