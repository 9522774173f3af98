use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

use crate::model::TrackRequest;
use crate::ports::process::{CommandLine, ProcessRunner};
use crate::services::resolver::{AcquisitionHook, ResolutionOutcome};

const TITLE_PLACEHOLDER: &str = "${title}";
const ARTIST_PLACEHOLDER: &str = "${artist}";

/// One configured acquisition source, classified from its template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionSource {
    /// A remote streaming link. Reserved for future resolution strategies;
    /// never attempted during acquisition.
    RemoteLink(String),
    /// A command template with `${title}`/`${artist}` placeholders, run as an
    /// external process.
    Command(String),
}

impl AcquisitionSource {
    pub fn from_config(raw: &str) -> Self {
        if raw.starts_with("https") {
            Self::RemoteLink(raw.to_string())
        } else {
            Self::Command(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStatus {
    /// Some source reported success. The acquired file sits on disk; it only
    /// becomes a library item once the caller triggers a rescan.
    Acquired,
    /// Every source failed, or none is configured.
    Unavailable,
}

/// Invokes the configured acquisition sources, in order, to fetch media the
/// library does not yet have. A single source's failure never aborts the
/// remaining sources or the caller; only cancellation escapes.
pub struct AcquisitionGateway {
    sources: Vec<AcquisitionSource>,
    runner: Arc<dyn ProcessRunner>,
}

impl AcquisitionGateway {
    pub fn new(sources: Vec<AcquisitionSource>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { sources, runner }
    }

    /// Try each source until one succeeds.
    pub async fn acquire(
        &self,
        track: &TrackRequest,
        cancel: &CancellationToken,
    ) -> Result<AcquisitionStatus> {
        for source in &self.sources {
            if cancel.is_cancelled() {
                return Err(color_eyre::eyre::eyre!("acquisition cancelled"));
            }

            let template = match source {
                AcquisitionSource::RemoteLink(link) => {
                    log::debug!("Skipping remote-link source {}", link);
                    continue;
                }
                AcquisitionSource::Command(template) => template,
            };

            let command = build_command(template, track);
            match self.runner.run(&command, cancel).await {
                Ok(output) if output.success() => {
                    log::info!(
                        "Acquired '{}' by '{}' via '{}'",
                        track.title,
                        track.artist,
                        command.program
                    );
                    return Ok(AcquisitionStatus::Acquired);
                }
                Ok(output) => {
                    log::warn!(
                        "Acquisition source '{}' exited with {:?} for '{}': {}",
                        command.program,
                        output.exit_code,
                        track.title,
                        output.stderr.trim()
                    );
                }
                Err(error) => {
                    if cancel.is_cancelled() {
                        return Err(error);
                    }
                    log::warn!(
                        "Acquisition source '{}' failed for '{}': {:#}",
                        command.program,
                        track.title,
                        error
                    );
                }
            }
        }

        Ok(AcquisitionStatus::Unavailable)
    }
}

/// Substitute the track into the template (each placeholder becomes a single
/// double-quoted argument) and split into executable plus argument string.
fn build_command(template: &str, track: &TrackRequest) -> CommandLine {
    let interpolated = template
        .replace(TITLE_PLACEHOLDER, &format!("\"{}\"", track.title))
        .replace(ARTIST_PLACEHOLDER, &format!("\"{}\"", track.artist));
    CommandLine::parse(&interpolated)
}

#[async_trait::async_trait]
impl AcquisitionHook for AcquisitionGateway {
    /// Resolver-facing shape: even a successful acquisition yields no library
    /// item — the file is not indexed until the next rescan, so the track
    /// stays unresolved for this pass.
    async fn acquire(
        &self,
        track: &TrackRequest,
        cancel: &CancellationToken,
    ) -> Result<ResolutionOutcome> {
        match AcquisitionGateway::acquire(self, track, cancel).await? {
            AcquisitionStatus::Acquired => Ok(ResolutionOutcome::Unresolved),
            AcquisitionStatus::Unavailable => {
                log::warn!(
                    "Every acquisition source failed for '{}' by '{}'",
                    track.title,
                    track.artist
                );
                Ok(ResolutionOutcome::Unresolved)
            }
        }
    }
}
