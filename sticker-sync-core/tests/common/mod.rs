#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sticker_sync_core::config::{DestinationConfig, NamePolicy, SourceConfig, SyncConfig};
use sticker_sync_core::contract::{
    Block, CatalogSticker, DestinationProfile, MockCatalogReader, MockSourceDatabase,
    PropertyValue, RawRecord, RecordPage,
};

pub const DATABASE_ID: &str = "sticker-db";
pub const COUNT_ID: &str = "count-prop";
pub const EXCLUDE_ID: &str = "exclude-prop";
pub const USERNAME: &str = "alice";

pub fn sync_config() -> SyncConfig {
    SyncConfig {
        source: SourceConfig {
            database_id: DATABASE_ID.to_string(),
            count_property_id: COUNT_ID.to_string(),
            exclude_property_id: EXCLUDE_ID.to_string(),
            title_property_id: "title".to_string(),
        },
        destination: DestinationConfig {
            username: USERNAME.to_string(),
        },
        policy: NamePolicy::default(),
        dry_run: false,
    }
}

/// One record as the fake source database serves it.
#[derive(Debug, Clone)]
pub struct FakeSticker {
    pub id: String,
    pub title: PropertyValue,
    pub count: PropertyValue,
    pub exclude: PropertyValue,
    pub block: Option<Block>,
}

impl FakeSticker {
    /// A record that passes every gate.
    pub fn valid(id: &str, name: &str, count: u32) -> Self {
        Self {
            id: id.to_string(),
            title: PropertyValue::Title(vec![name.to_string()]),
            count: PropertyValue::Number(Some(count as f64)),
            exclude: PropertyValue::Checkbox(false),
            block: Some(Block::HostedImage {
                url: format!("https://files.example.com/{id}/{name}.png"),
            }),
        }
    }

    pub fn excluded(mut self) -> Self {
        self.exclude = PropertyValue::Checkbox(true);
        self
    }

    pub fn with_block(mut self, block: Option<Block>) -> Self {
        self.block = block;
        self
    }
}

/// Every property/block request made against the fake, as `record_id:what`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// A mock source database serving `pages` in order, linked by cursors `cursor-<n>`.
pub fn fake_source(pages: Vec<Vec<FakeSticker>>) -> (MockSourceDatabase, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let by_id: Arc<HashMap<String, FakeSticker>> = Arc::new(
        pages
            .iter()
            .flatten()
            .map(|s| (s.id.clone(), s.clone()))
            .collect(),
    );
    let listing: Arc<Vec<Vec<RawRecord>>> = Arc::new(
        pages
            .iter()
            .map(|page| page.iter().map(|s| RawRecord::new(s.id.clone())).collect())
            .collect(),
    );

    let mut source = MockSourceDatabase::new();

    let pages_for_query = listing.clone();
    source
        .expect_query_records()
        .returning(move |database_id, cursor| {
            assert_eq!(database_id, DATABASE_ID);
            let index = match cursor {
                None => 0,
                Some(c) => c
                    .strip_prefix("cursor-")
                    .and_then(|n| n.parse::<usize>().ok())
                    .expect("cursor issued by the fake"),
            };
            let records = pages_for_query.get(index).cloned().unwrap_or_default();
            let has_more = index + 1 < pages_for_query.len();
            Ok(RecordPage {
                records,
                has_more,
                next_cursor: has_more.then(|| format!("cursor-{}", index + 1)),
            })
        });

    let props = by_id.clone();
    let prop_calls = calls.clone();
    source
        .expect_retrieve_property()
        .returning(move |record_id, property_id| {
            prop_calls
                .lock()
                .unwrap()
                .push(format!("{record_id}:{property_id}"));
            let sticker = props.get(record_id).expect("known record");
            Ok(match property_id {
                "title" => sticker.title.clone(),
                COUNT_ID => sticker.count.clone(),
                EXCLUDE_ID => sticker.exclude.clone(),
                other => panic!("unexpected property id {other}"),
            })
        });

    let blocks = by_id;
    let block_calls = calls.clone();
    source.expect_first_block().returning(move |record_id| {
        block_calls
            .lock()
            .unwrap()
            .push(format!("{record_id}:block"));
        Ok(blocks.get(record_id).expect("known record").block.clone())
    });

    (source, calls)
}

/// A mock catalog listing `names` on the test user's profile.
pub fn fake_catalog(names: &[&str]) -> MockCatalogReader {
    let stickers: Vec<CatalogSticker> = names
        .iter()
        .enumerate()
        .map(|(i, name)| CatalogSticker {
            id: format!("st-{i}"),
            name: name.to_string(),
            image_url: format!("https://stickertrade.ca/img/{i}.png"),
        })
        .collect();
    let mut catalog = MockCatalogReader::new();
    catalog.expect_fetch_profile().returning(move |username| {
        assert_eq!(username, USERNAME);
        Ok(DestinationProfile {
            username: username.to_string(),
            avatar_url: None,
            stickers: stickers.clone(),
        })
    });
    catalog
}
