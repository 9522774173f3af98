use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

use crate::model::TrackRequest;
use crate::ports::library::{LibraryItem, MusicLibrary};

/// Outcome of mapping one title/artist pair to a concrete library item.
/// Every caller handles both arms explicitly; "no match" is a normal result,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Matched(LibraryItem),
    Unresolved,
}

/// Last-resort hook invoked when a track cannot be resolved from the library.
/// Wired to the acquisition gateway by the reconciler's fetch pass; absent in
/// the confirm pass.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AcquisitionHook: Send + Sync {
    async fn acquire(
        &self,
        track: &TrackRequest,
        cancel: &CancellationToken,
    ) -> Result<ResolutionOutcome>;
}

/// Maps a (title, artist) pair to a best-candidate library item.
///
/// Matching is deliberately loose: a case-insensitive substring hit between
/// any artist token and any of a candidate's artists is accepted. False
/// positives are the cost of tolerating artist-string variation ("feat."
/// credits, parenthesized co-artists); this is an approximation, not a
/// precision guarantee.
pub struct SongResolver {
    library: Arc<dyn MusicLibrary>,
}

impl SongResolver {
    pub fn new(library: Arc<dyn MusicLibrary>) -> Self {
        Self { library }
    }

    /// Resolve one track. When `acquire` is supplied it is invoked as a last
    /// resort and its outcome is final — the resolver does not loop; the
    /// caller re-queries on its own schedule (after a rescan).
    pub async fn resolve(
        &self,
        track: &TrackRequest,
        acquire: Option<&dyn AcquisitionHook>,
        cancel: &CancellationToken,
    ) -> Result<ResolutionOutcome> {
        log::debug!("Querying library for '{}'", track.title);
        let tokens = tokenize_artist(&track.artist);

        let candidates = self.library.search_by_title(&track.title).await?;
        if let Some(item) = first_artist_match(candidates, &tokens) {
            return Ok(ResolutionOutcome::Matched(item));
        }

        if cancel.is_cancelled() {
            return Err(color_eyre::eyre::eyre!("resolution cancelled"));
        }

        // Title search came up empty-handed; fall back to the filename index.
        // It is precision-oriented but artist-blind, so a single hit is
        // trusted as-is — filtering it by artist produces false negatives for
        // credit variations the filename never carried.
        let fallback = self.library.search_by_filename(&track.title).await?;
        if fallback.len() != 1 {
            log::debug!(
                "Filename index returned {} results for ('{}', '{}')",
                fallback.len(),
                track.title,
                track.artist
            );
        }
        if fallback.len() == 1 {
            let item = fallback.into_iter().next().expect("length checked");
            return Ok(ResolutionOutcome::Matched(item));
        }
        if let Some(item) = first_artist_match(fallback, &tokens) {
            return Ok(ResolutionOutcome::Matched(item));
        }

        if let Some(hook) = acquire {
            log::debug!(
                "No library match for ('{}', '{}'); attempting acquisition",
                track.title,
                track.artist
            );
            return hook.acquire(track, cancel).await;
        }

        log::warn!(
            "No match for '{}' by '{}' in either index",
            track.title,
            track.artist
        );
        Ok(ResolutionOutcome::Unresolved)
    }
}

/// First candidate, in the index's original order, whose artist set has a
/// case-insensitive substring match against any token.
fn first_artist_match(candidates: Vec<LibraryItem>, tokens: &[String]) -> Option<LibraryItem> {
    candidates
        .into_iter()
        .find(|item| artist_matches(item, tokens))
}

fn artist_matches(item: &LibraryItem, tokens: &[String]) -> bool {
    item.artists.iter().any(|artist| {
        let artist = artist.to_lowercase();
        tokens.iter().any(|token| artist.contains(token))
    })
}

/// Tokenize an artist string on `(`, `)` and space, discarding empty tokens.
/// Tokens are lowercased once here so the substring comparison stays
/// case-insensitive without re-lowercasing per candidate.
fn tokenize_artist(artist: &str) -> Vec<String> {
    artist
        .split(['(', ')', ' '])
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
