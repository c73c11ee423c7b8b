#![doc = "Destination client: reads stickertrade profiles and creates stickers."]
//
//! # stickertrade client
//!
//! [`StickerTradeClient`] implements both [`CatalogReader`] (unauthenticated profile read)
//! and [`Uploader`] (image download plus authenticated multipart creation).
//!
//! - Construct it with [`StickerTradeClient::new_from_env`] (`STICKERTRADE_SESSION`), or
//!   with [`StickerTradeClient::new`] when the session is already known.
//! - A client without a session can still read profiles; creating stickers then fails.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sticker_sync_core::contract::{
    CatalogReader, CatalogSticker, ClientError, DestinationProfile, NewSticker, Uploader,
};

/// Remix route whose loader data the profile page serves as JSON.
const PROFILE_DATA_ROUTE: &str = "routes/profile/$username";
const CREATE_STICKER_PATH: &str = "/stickers/new";
const SESSION_COOKIE: &str = "__session";

pub struct StickerTradeClient {
    client: Client,
    base_url: String,
    session: Option<String>,
}

impl StickerTradeClient {
    pub fn new(base_url: impl Into<String>, session: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn new_from_env(base_url: &str) -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        match std::env::var("STICKERTRADE_SESSION") {
            Ok(session) if !session.is_empty() => {
                tracing::info!(
                    session_set = true,
                    base_url,
                    "Initialized StickerTradeClient from environment"
                );
                Ok(Self::new(base_url, Some(session)))
            }
            Ok(_) => {
                tracing::error!("STICKERTRADE_SESSION is empty");
                Err("STICKERTRADE_SESSION environment variable is empty".into())
            }
            Err(e) => {
                tracing::error!(error = ?e, "STICKERTRADE_SESSION missing in environment");
                Err(format!("STICKERTRADE_SESSION environment variable not set: {e}").into())
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    username: String,
    avatar_url: Option<String>,
    #[serde(default)]
    stickers: Vec<ProfileSticker>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSticker {
    id: String,
    name: String,
    image_url: String,
}

/// Content type for an image part, from its filename.
fn image_mime(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl CatalogReader for StickerTradeClient {
    async fn fetch_profile(&self, username: &str) -> Result<DestinationProfile, ClientError> {
        let url = format!("{}/profile/{}", self.base_url, username);
        tracing::info!(url = %url, "Fetching stickertrade profile");
        let response = self
            .client
            .get(&url)
            .query(&[("_data", PROFILE_DATA_ROUTE)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, username, body = %body, "Profile read failed");
            return Err(format!("profile read for {username} failed with status {status}: {body}").into());
        }
        let profile: ProfileResponse = response.json().await?;
        tracing::info!(
            username = %profile.username,
            stickers = profile.stickers.len(),
            "Fetched stickertrade profile"
        );
        Ok(DestinationProfile {
            username: profile.username,
            avatar_url: profile.avatar_url,
            stickers: profile
                .stickers
                .into_iter()
                .map(|s| CatalogSticker {
                    id: s.id,
                    name: s.name,
                    image_url: s.image_url,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl Uploader for StickerTradeClient {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "Image download failed");
            return Err(format!("image download failed with status {status}").into());
        }
        let bytes = response.bytes().await?;
        tracing::debug!(size = bytes.len(), "Downloaded image");
        Ok(bytes.to_vec())
    }

    async fn create_sticker(&self, sticker: NewSticker) -> Result<(), ClientError> {
        let Some(session) = &self.session else {
            tracing::error!(name = %sticker.name, "No stickertrade session configured");
            return Err("creating stickers requires a stickertrade session".into());
        };

        let url = format!("{}{}", self.base_url, CREATE_STICKER_PATH);
        tracing::info!(
            url = %url,
            name = %sticker.name,
            filename = %sticker.filename,
            size = sticker.image.len(),
            "Uploading new sticker"
        );
        let mime = image_mime(&sticker.filename);
        let image = Part::bytes(sticker.image)
            .file_name(sticker.filename)
            .mime_str(mime)?;
        let form = Form::new().text("name", sticker.name.clone()).part("image", image);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::COOKIE, format!("{SESSION_COOKIE}={session}"))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, name = %sticker.name, body = %body, "Sticker creation failed");
            return Err(format!("creating sticker failed with status {status}: {body}").into());
        }
        tracing::info!(name = %sticker.name, %status, "Successfully created sticker");
        Ok(())
    }
}
