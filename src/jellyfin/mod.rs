//! HTTP adapter for a Jellyfin-compatible media server.
//!
//! Implements the `MusicLibrary`, `PlaylistStore` and `UserDirectory` ports
//! on top of the server's REST API. Endpoint helpers live in the submodules;
//! this module owns the client and the port trait implementations.

pub mod items;
pub mod library;
pub mod playlists;
pub mod users;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::ports::library::{ItemId, LibraryItem, MusicLibrary};
use crate::ports::playlists::{AccountId, PlaylistCreateRequest, PlaylistStore, PlaylistSummary};
use crate::ports::users::UserDirectory;

pub struct JellyfinClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl JellyfinClient {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .wrap_err_with(|| format!("Invalid endpoint path: {}", path))
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("X-Emby-Token", &self.api_key)
            .header("Accept", "application/json")
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.post(url).header("X-Emby-Token", &self.api_key)
    }

    fn delete(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.delete(url).header("X-Emby-Token", &self.api_key)
    }
}

#[async_trait::async_trait]
impl MusicLibrary for JellyfinClient {
    async fn search_by_title(&self, term: &str) -> Result<Vec<LibraryItem>> {
        let items = self.search_audio(term).await?;
        Ok(items
            .into_iter()
            .map(items::ItemDto::into_library_item)
            .collect())
    }

    async fn search_by_filename(&self, term: &str) -> Result<Vec<LibraryItem>> {
        // The server has no filename search endpoint; list the audio items
        // with their paths and filter client-side.
        let items = self.audio_items_with_paths().await?;
        Ok(items
            .into_iter()
            .filter(|item| items::path_contains(item, term))
            .map(items::ItemDto::into_library_item)
            .collect())
    }

    async fn rescan(&self, cancel: &CancellationToken) -> Result<()> {
        self.start_library_refresh().await?;
        self.wait_for_refresh(cancel).await
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        self.delete_item_by_id(id).await
    }
}

#[async_trait::async_trait]
impl PlaylistStore for JellyfinClient {
    async fn playlists_for(&self, owner: &AccountId) -> Result<Vec<PlaylistSummary>> {
        self.playlists_of(owner).await
    }

    async fn create(&self, request: PlaylistCreateRequest) -> Result<ItemId> {
        self.create_playlist(&request).await
    }
}

#[async_trait::async_trait]
impl UserDirectory for JellyfinClient {
    async fn first_admin(&self) -> Result<Option<AccountId>> {
        self.first_admin_account().await
    }
}
