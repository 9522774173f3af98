use color_eyre::eyre::Result;

use crate::ports::library::ItemId;

/// Opaque identifier of a server account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A playlist as listed by the server, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: ItemId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Audio,
}

/// Creation request for a replacement playlist. `item_ids` is ordered and may
/// contain duplicates — a track appearing twice in the source yields two
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistCreateRequest {
    pub name: String,
    pub item_ids: Vec<ItemId>,
    pub owner: AccountId,
    pub media_type: MediaType,
    pub public: bool,
}

/// Port trait wrapping the server's playlist capabilities.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistStore: Send + Sync {
    /// All playlists owned by (or visible to) the given account.
    async fn playlists_for(&self, owner: &AccountId) -> Result<Vec<PlaylistSummary>>;

    /// Create a playlist and return its id.
    async fn create(&self, request: PlaylistCreateRequest) -> Result<ItemId>;
}
