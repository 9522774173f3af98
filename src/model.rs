use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;

/// One title/artist pair requested by a generator. The artist string may
/// carry several names ("A feat. B", "A (B)"); it is tokenized at match
/// time, never rewritten here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackRequest {
    pub title: String,
    pub artist: String,
}

/// The target state for one playlist, parsed from a generator command's
/// stdout. Lives only for the duration of one rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DesiredPlaylist {
    pub name: String,
    #[serde(rename = "songs")]
    pub tracks: Vec<TrackRequest>,
}

impl DesiredPlaylist {
    /// Parse the generator wire shape `{"name": ..., "songs": [{"title", "artist"}]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).wrap_err("Failed to parse generator output as a playlist")
    }
}
