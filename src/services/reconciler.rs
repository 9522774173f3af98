use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio_util::sync::CancellationToken;

use crate::model::DesiredPlaylist;
use crate::ports::library::{ItemId, MusicLibrary};
use crate::ports::playlists::{AccountId, MediaType, PlaylistCreateRequest, PlaylistStore};
use crate::services::acquisition::AcquisitionGateway;
use crate::services::resolver::{AcquisitionHook, ResolutionOutcome, SongResolver};

/// Rebuilds one playlist from its desired state.
///
/// Two resolution passes are required because acquisition effects are only
/// visible to the library after an explicit rescan: the fetch pass exists
/// solely to trigger downloads for missing tracks, the confirm pass collects
/// item ids from the refreshed index. Between the passes the old playlist of
/// the same name is deleted unconditionally — replace over append.
pub struct PlaylistReconciler {
    library: Arc<dyn MusicLibrary>,
    playlists: Arc<dyn PlaylistStore>,
    resolver: SongResolver,
    gateway: Arc<AcquisitionGateway>,
    owner: AccountId,
}

impl PlaylistReconciler {
    pub fn new(
        library: Arc<dyn MusicLibrary>,
        playlists: Arc<dyn PlaylistStore>,
        resolver: SongResolver,
        gateway: Arc<AcquisitionGateway>,
        owner: AccountId,
    ) -> Self {
        Self {
            library,
            playlists,
            resolver,
            gateway,
            owner,
        }
    }

    /// Replace any existing playlist named `desired.name` with a freshly
    /// resolved one. Returns the new playlist's id. Unresolved tracks are
    /// skipped, never fatal; a rebuild that resolves nothing still replaces
    /// the old playlist with an empty one.
    pub async fn rebuild(
        &self,
        desired: &DesiredPlaylist,
        cancel: &CancellationToken,
    ) -> Result<ItemId> {
        log::info!(
            "Rebuilding playlist '{}' ({} tracks)",
            desired.name,
            desired.tracks.len()
        );

        // Fetch pass: outcomes are discarded on purpose. Its only job is to
        // kick off acquisitions for tracks the library does not have yet.
        for track in &desired.tracks {
            if cancel.is_cancelled() {
                return Err(eyre!("rebuild cancelled"));
            }
            let hook: &dyn AcquisitionHook = self.gateway.as_ref();
            match self.resolver.resolve(track, Some(hook), cancel).await {
                Ok(_) => {}
                Err(error) => {
                    if cancel.is_cancelled() {
                        return Err(error);
                    }
                    log::warn!(
                        "Fetch pass failed for '{}' by '{}': {:#}",
                        track.title,
                        track.artist,
                        error
                    );
                }
            }
        }

        self.library
            .rescan(cancel)
            .await
            .wrap_err("Library rescan failed")?;

        self.delete_existing(&desired.name).await?;

        // Confirm pass: acquisition already ran above; retrying here would
        // duplicate downloads. Matched ids are collected in track order,
        // duplicates allowed.
        let mut item_ids = Vec::new();
        for track in &desired.tracks {
            if cancel.is_cancelled() {
                return Err(eyre!("rebuild cancelled"));
            }
            match self.resolver.resolve(track, None, cancel).await {
                Ok(ResolutionOutcome::Matched(item)) => {
                    log::debug!("Resolved '{}' to item {}", track.title, item.id);
                    item_ids.push(item.id);
                }
                Ok(ResolutionOutcome::Unresolved) => {
                    log::warn!(
                        "Skipping unresolved track '{}' by '{}'",
                        track.title,
                        track.artist
                    );
                }
                Err(error) => {
                    if cancel.is_cancelled() {
                        return Err(error);
                    }
                    log::warn!(
                        "Confirm pass failed for '{}' by '{}': {:#}",
                        track.title,
                        track.artist,
                        error
                    );
                }
            }
        }

        let resolved = item_ids.len();
        let playlist_id = self
            .playlists
            .create(PlaylistCreateRequest {
                name: desired.name.clone(),
                item_ids,
                owner: self.owner.clone(),
                media_type: MediaType::Audio,
                public: true,
            })
            .await
            .wrap_err_with(|| format!("Failed to create playlist '{}'", desired.name))?;

        log::info!(
            "Created playlist '{}' ({}) with {}/{} tracks",
            desired.name,
            playlist_id,
            resolved,
            desired.tracks.len()
        );
        Ok(playlist_id)
    }

    /// Delete the target account's playlist with this exact name, if one
    /// exists, including its backing storage. Absence is not an error.
    async fn delete_existing(&self, name: &str) -> Result<()> {
        let playlists = self.playlists.playlists_for(&self.owner).await?;
        let Some(existing) = playlists.into_iter().find(|p| p.name == name) else {
            return Ok(());
        };

        self.library
            .delete_item(&existing.id)
            .await
            .wrap_err_with(|| format!("Failed to delete old playlist '{}'", name))?;
        log::info!("Deleted old playlist '{}' ({})", name, existing.id);
        Ok(())
    }
}
