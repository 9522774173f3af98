use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

/// Opaque identifier of a library item (song or playlist).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A song as the media library indexes it. Read-only to this tool; items are
/// created and removed by the server itself (acquisition only drops files on
/// disk, which a rescan then picks up).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryItem {
    pub id: ItemId,
    pub title: String,
    pub artists: Vec<String>,
}

/// Port trait wrapping the media-library capabilities used by resolution and
/// reconciliation.
///
/// The production implementation is `jellyfin::JellyfinClient`; tests use
/// mocks. Both query operations hit the live index on every call — the
/// library may have changed between calls (e.g. after an acquisition).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MusicLibrary: Send + Sync {
    /// Title search over audio items, ranked by the index's relevance.
    async fn search_by_title(&self, term: &str) -> Result<Vec<LibraryItem>>;

    /// Substring match over file paths. Precision-oriented but artist-blind.
    async fn search_by_filename(&self, term: &str) -> Result<Vec<LibraryItem>>;

    /// Trigger a full library rescan and wait for it to complete.
    async fn rescan(&self, cancel: &CancellationToken) -> Result<()>;

    /// Delete an item and its backing file location, recursively.
    async fn delete_item(&self, id: &ItemId) -> Result<()>;
}
