//! # Notion source client
//!
//! Implements [`SourceDatabase`] over the Notion REST API with `reqwest`.
//!
//! - Construct [`NotionClient`] with [`NotionClient::new_from_env`] (`NOTION_TOKEN`) or
//!   [`NotionClient::new`] for an explicit token and base URL.
//! - Property and block responses are decoded into the core's tagged unions; kinds the
//!   pipeline does not read come back as `Other { kind }` rather than as errors, so the
//!   validator decides what is fatal.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sticker_sync_core::contract::{
    Block, ClientError, PropertyValue, RawRecord, RecordPage, SourceDatabase,
};

/// API version the request and response shapes below follow.
pub const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionClient {
    client: Client,
    base_url: String,
    token: String,
}

impl NotionClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn new_from_env(base_url: &str) -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        match std::env::var("NOTION_TOKEN") {
            Ok(token) if !token.is_empty() => {
                tracing::info!(
                    token_len = token.len(),
                    base_url,
                    "Initialized NotionClient from environment"
                );
                Ok(Self::new(base_url, token))
            }
            Ok(_) => {
                tracing::error!("NOTION_TOKEN is empty");
                Err("NOTION_TOKEN environment variable is empty".into())
            }
            Err(e) => {
                tracing::error!(error = ?e, "NOTION_TOKEN missing in environment");
                Err(format!("NOTION_TOKEN environment variable not set: {e}").into())
            }
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, what, body = %body, "Notion API returned error");
            return Err(format!("Notion {what} failed with status {status}: {body}").into());
        }
        Ok(response.json::<T>().await?)
    }
}

#[derive(Serialize)]
struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<PageRef>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct PageRef {
    id: String,
}

/// A single property item as returned by the property endpoint.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PropertyItem {
    Title { title: RichText },
    Number { number: Option<f64> },
    Checkbox { checkbox: bool },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct RichText {
    plain_text: String,
}

#[derive(Deserialize)]
struct BlockList {
    results: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ImageObject {
    File { file: FileObject },
    External { external: FileObject },
}

#[derive(Deserialize)]
struct FileObject {
    url: String,
}

/// One decoded response of the property endpoint.
#[derive(Debug, PartialEq)]
struct PropertyPage {
    value: PropertyValue,
    /// Cursor of the next page of property items, when the value continues.
    next_cursor: Option<String>,
}

/// Decodes a property endpoint response.
///
/// Title (and other paginated) properties come back as `{"object": "list"}` holding
/// property items, possibly over several pages; scalar properties come back as a
/// single `property_item`.
fn property_page(body: Value) -> Result<PropertyPage, ClientError> {
    let object = body.get("object").and_then(Value::as_str).unwrap_or("");
    if object == "list" {
        let kind = body
            .pointer("/property_item/type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        if kind != "title" {
            return Ok(PropertyPage {
                value: PropertyValue::Other { kind },
                next_cursor: None,
            });
        }
        let has_more = body.get("has_more").and_then(Value::as_bool).unwrap_or(false);
        let next_cursor = body
            .get("next_cursor")
            .and_then(Value::as_str)
            .map(str::to_string);
        if has_more && next_cursor.is_none() {
            return Err("title property reports more items but no cursor".into());
        }
        let items: Vec<PropertyItem> = match body.get("results") {
            Some(results) => serde_json::from_value(results.clone())?,
            None => Vec::new(),
        };
        let mut segments = Vec::with_capacity(items.len());
        for item in items {
            match item {
                PropertyItem::Title { title } => segments.push(title.plain_text),
                _ => {
                    return Ok(PropertyPage {
                        value: PropertyValue::Other { kind },
                        next_cursor: None,
                    })
                }
            }
        }
        return Ok(PropertyPage {
            value: PropertyValue::Title(segments),
            next_cursor: next_cursor.filter(|_| has_more),
        });
    }

    let kind = body
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let value = match serde_json::from_value::<PropertyItem>(body)? {
        PropertyItem::Title { title } => PropertyValue::Title(vec![title.plain_text]),
        PropertyItem::Number { number } => PropertyValue::Number(number),
        PropertyItem::Checkbox { checkbox } => PropertyValue::Checkbox(checkbox),
        PropertyItem::Unsupported => PropertyValue::Other { kind },
    };
    Ok(PropertyPage {
        value,
        next_cursor: None,
    })
}

/// Decodes one block object. Partial blocks carry no `type` and decode as `Other`.
fn block_value(block: Value) -> Result<Block, ClientError> {
    let Some(kind) = block.get("type").and_then(Value::as_str) else {
        return Ok(Block::Other {
            kind: "partial".to_string(),
        });
    };
    if kind != "image" {
        return Ok(Block::Other {
            kind: kind.to_string(),
        });
    }
    let image = block
        .get("image")
        .cloned()
        .ok_or("image block has no image object")?;
    Ok(match serde_json::from_value::<ImageObject>(image)? {
        ImageObject::File { file } => Block::HostedImage { url: file.url },
        ImageObject::External { external } => Block::ExternalImage { url: external.url },
    })
}

#[async_trait]
impl SourceDatabase for NotionClient {
    async fn query_records(
        &self,
        database_id: &str,
        cursor: Option<String>,
    ) -> Result<RecordPage, ClientError> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        tracing::debug!(url = %url, cursor = ?cursor, "Querying Notion database");
        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&QueryRequest {
                start_cursor: cursor,
            });
        let response: QueryResponse = self.send_json(request, "database query").await?;
        tracing::debug!(
            results = response.results.len(),
            has_more = response.has_more,
            "Notion database page received"
        );
        Ok(RecordPage {
            records: response
                .results
                .into_iter()
                .map(|page| RawRecord::new(page.id))
                .collect(),
            has_more: response.has_more,
            next_cursor: response.next_cursor,
        })
    }

    async fn retrieve_property(
        &self,
        record_id: &str,
        property_id: &str,
    ) -> Result<PropertyValue, ClientError> {
        let url = format!(
            "{}/pages/{}/properties/{}",
            self.base_url, record_id, property_id
        );
        let mut segments: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            tracing::debug!(url = %url, cursor = ?cursor, "Retrieving Notion page property");
            let mut request = self.get(&url);
            if let Some(start) = &cursor {
                request = request.query(&[("start_cursor", start.as_str())]);
            }
            let body: Value = self.send_json(request, "property retrieval").await?;
            let page = property_page(body)?;
            match page.value {
                PropertyValue::Title(mut part) => segments.append(&mut part),
                other => return Ok(other),
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(PropertyValue::Title(segments)),
            }
        }
    }

    async fn first_block(&self, record_id: &str) -> Result<Option<Block>, ClientError> {
        let url = format!("{}/blocks/{}/children", self.base_url, record_id);
        tracing::debug!(url = %url, "Listing first Notion block");
        let request = self.get(&url).query(&[("page_size", "1")]);
        let list: BlockList = self.send_json(request, "block listing").await?;
        list.results.into_iter().next().map(block_value).transpose()
    }
}
