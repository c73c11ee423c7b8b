//! Destination catalog: which sticker names are already published.

use std::collections::HashSet;

use tracing::{error, info};

use crate::contract::CatalogReader;
use crate::error::SyncError;

/// Names of the stickers already present on the destination profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationNameSet {
    names: HashSet<String>,
}

impl DestinationNameSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DestinationNameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reads the profile of `username` once and keeps the sticker names.
pub async fn read_destination_names<C>(
    catalog: &C,
    username: &str,
) -> Result<DestinationNameSet, SyncError>
where
    C: CatalogReader + ?Sized,
{
    info!(username, "Reading destination catalog");
    let profile = catalog.fetch_profile(username).await.map_err(|e| {
        error!(error = %e, username, "Failed to read destination catalog");
        SyncError::Catalog {
            username: username.to_string(),
            source: e,
        }
    })?;

    let listed = profile.stickers.len();
    let names: DestinationNameSet = profile.stickers.into_iter().map(|s| s.name).collect();
    info!(
        username = %profile.username,
        listed,
        distinct = names.len(),
        "Read destination catalog"
    );
    Ok(names)
}
