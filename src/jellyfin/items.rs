use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::jellyfin::JellyfinClient;
use crate::ports::library::{ItemId, LibraryItem};

/// Hits returned per title search. The resolver only ever takes the first
/// artist-filtered candidate, so a short ranked page is enough.
const SEARCH_LIMIT: u32 = 50;

/// Page size for the full audio listing behind the filename index.
const PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct ItemsPage {
    #[serde(rename = "Items", default)]
    pub items: Vec<ItemDto>,

    #[serde(rename = "TotalRecordCount", default)]
    pub total_record_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDto {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Artists", default)]
    pub artists: Vec<String>,

    #[serde(rename = "Path", default)]
    pub path: Option<String>,
}

impl ItemDto {
    pub fn into_library_item(self) -> LibraryItem {
        LibraryItem {
            id: ItemId::new(self.id),
            title: self.name,
            artists: self.artists,
        }
    }
}

/// Case-insensitive substring match of `term` against the item's file path.
pub fn path_contains(item: &ItemDto, term: &str) -> bool {
    let needle = term.to_lowercase();
    item.path
        .as_ref()
        .is_some_and(|path| path.to_lowercase().contains(&needle))
}

impl JellyfinClient {
    /// Ranked title search over audio items.
    ///
    /// Endpoint: `GET /Items?searchTerm=...&includeItemTypes=Audio`
    pub(crate) async fn search_audio(&self, term: &str) -> Result<Vec<ItemDto>> {
        let mut url = self.endpoint("Items")?;
        url.query_pairs_mut()
            .append_pair("searchTerm", term)
            .append_pair("includeItemTypes", "Audio")
            .append_pair("recursive", "true")
            .append_pair("limit", &SEARCH_LIMIT.to_string());

        let page = self
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<ItemsPage>()
            .await
            .wrap_err("Failed to deserialize item search response")?;

        Ok(page.items)
    }

    /// Every audio item in the library, with file paths, fetched page by
    /// page. Backs the filename fallback index.
    pub(crate) async fn audio_items_with_paths(&self) -> Result<Vec<ItemDto>> {
        let mut items = Vec::new();
        let mut start_index: u32 = 0;

        loop {
            let mut url = self.endpoint("Items")?;
            url.query_pairs_mut()
                .append_pair("includeItemTypes", "Audio")
                .append_pair("recursive", "true")
                .append_pair("fields", "Path")
                .append_pair("startIndex", &start_index.to_string())
                .append_pair("limit", &PAGE_SIZE.to_string());

            let page = self
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<ItemsPage>()
                .await
                .wrap_err("Failed to deserialize item listing response")?;

            let fetched = page.items.len() as u32;
            items.extend(page.items);
            start_index += fetched;

            if fetched == 0 || start_index >= page.total_record_count {
                break;
            }
        }

        Ok(items)
    }
}
