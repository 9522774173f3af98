use std::sync::Arc;

use color_eyre::eyre::{OptionExt, Result, WrapErr, eyre};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::model::DesiredPlaylist;
use crate::ports::library::{ItemId, MusicLibrary};
use crate::ports::playlists::PlaylistStore;
use crate::ports::process::{CommandLine, ProcessRunner};
use crate::ports::users::UserDirectory;
use crate::services::acquisition::AcquisitionGateway;
use crate::services::reconciler::PlaylistReconciler;
use crate::services::resolver::SongResolver;

/// Drives one batch run: every configured generator command is executed,
/// parsed and handed to the reconciler, strictly sequentially. One command's
/// failure never stops the rest of the batch.
pub struct RebuildOrchestrator {
    commands: Vec<String>,
    runner: Arc<dyn ProcessRunner>,
    reconciler: PlaylistReconciler,
}

impl RebuildOrchestrator {
    /// Wire the orchestrator from configuration and collaborators. Fails fast
    /// when no administrator account exists — without a target account there
    /// is nothing to own the generated playlists.
    pub async fn new(
        config: &Config,
        library: Arc<dyn MusicLibrary>,
        playlists: Arc<dyn PlaylistStore>,
        users: Arc<dyn UserDirectory>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Result<Self> {
        let owner = users
            .first_admin()
            .await
            .wrap_err("Failed to look up accounts")?
            .ok_or_eyre("No administrator account found on the server")?;
        log::debug!("Generated playlists will be owned by account {}", owner);

        let gateway = Arc::new(AcquisitionGateway::new(
            config.acquisition_sources(),
            runner.clone(),
        ));
        let resolver = SongResolver::new(library.clone());
        let reconciler = PlaylistReconciler::new(library, playlists, resolver, gateway, owner);

        Ok(Self {
            commands: config.generator_commands().to_vec(),
            runner,
            reconciler,
        })
    }

    /// Run the whole batch. Returns `Ok` even when individual commands
    /// failed; only cancellation (or a poisoned start) aborts early.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        log::info!("Rebuilding playlists from {} commands", self.commands.len());

        for command in &self.commands {
            if cancel.is_cancelled() {
                return Err(eyre!("rebuild batch cancelled"));
            }
            match self.rebuild_from_command(command, cancel).await {
                Ok(playlist_id) => {
                    log::info!("Command '{}' produced playlist {}", command, playlist_id);
                }
                Err(error) => {
                    if cancel.is_cancelled() {
                        return Err(error);
                    }
                    log::error!("Command '{}' failed: {:#}", command, error);
                }
            }
        }

        Ok(())
    }

    async fn rebuild_from_command(
        &self,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<ItemId> {
        log::debug!("Executing generator command '{}'", command);

        // Generator contract: the configured string is an executable invoked
        // with no arguments, emitting the desired playlist as JSON on stdout.
        let output = self.runner.run(&CommandLine::bare(command), cancel).await?;
        if !output.success() {
            return Err(eyre!(
                "generator exited with {:?}: {}",
                output.exit_code,
                output.stderr.trim()
            ));
        }

        let desired = DesiredPlaylist::from_json(&output.stdout)?;
        self.reconciler.rebuild(&desired, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::library::{LibraryItem, MockMusicLibrary};
    use crate::ports::playlists::{AccountId, MockPlaylistStore};
    use crate::ports::process::{MockProcessRunner, ProcessOutput};
    use crate::ports::users::MockUserDirectory;

    fn generator_output(json: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(0),
            stdout: json.to_string(),
            stderr: String::new(),
        }
    }

    fn admin_directory() -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users
            .expect_first_admin()
            .returning(|| Ok(Some(AccountId::new("admin"))));
        users
    }

    fn library_with_song_a() -> MockMusicLibrary {
        let mut library = MockMusicLibrary::new();
        library.expect_search_by_title().returning(|term| {
            if term == "Song A" {
                Ok(vec![LibraryItem {
                    id: crate::ports::library::ItemId::new("item-a"),
                    title: "Song A".to_string(),
                    artists: vec!["Artist X".to_string()],
                }])
            } else {
                Ok(vec![])
            }
        });
        library.expect_search_by_filename().returning(|_| Ok(vec![]));
        library.expect_rescan().returning(|_| Ok(()));
        library
    }

    async fn orchestrator(
        commands: Vec<&str>,
        library: MockMusicLibrary,
        playlists: MockPlaylistStore,
        runner: MockProcessRunner,
    ) -> RebuildOrchestrator {
        let config = Config::for_tests(
            commands.into_iter().map(String::from).collect(),
            Vec::new(),
        );
        RebuildOrchestrator::new(
            &config,
            Arc::new(library),
            Arc::new(playlists),
            Arc::new(admin_directory()),
            Arc::new(runner),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_admin_account_fails_construction() {
        let mut users = MockUserDirectory::new();
        users.expect_first_admin().returning(|| Ok(None));

        let result = RebuildOrchestrator::new(
            &Config::for_tests(Vec::new(), Vec::new()),
            Arc::new(MockMusicLibrary::new()),
            Arc::new(MockPlaylistStore::new()),
            Arc::new(users),
            Arc::new(MockProcessRunner::new()),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generator_output_drives_a_rebuild() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .withf(|command, _| command.program == "gen-chart" && command.args.is_empty())
            .returning(|_, _| {
                Ok(generator_output(
                    r#"{"name": "Chart", "songs": [{"title": "Song A", "artist": "Artist X"}]}"#,
                ))
            });

        let mut playlists = MockPlaylistStore::new();
        playlists.expect_playlists_for().returning(|_| Ok(vec![]));
        playlists
            .expect_create()
            .times(1)
            .withf(|request| request.name == "Chart" && request.item_ids.len() == 1)
            .returning(|_| Ok(crate::ports::library::ItemId::new("playlist-1")));

        let orchestrator =
            orchestrator(vec!["gen-chart"], library_with_song_a(), playlists, runner).await;
        orchestrator.run(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_command_does_not_stop_the_batch() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|command, _| {
            Ok(match command.program.as_str() {
                "broken" => ProcessOutput {
                    exit_code: Some(0),
                    stdout: "this is not json".to_string(),
                    stderr: String::new(),
                },
                _ => generator_output(
                    r#"{"name": "Chart", "songs": [{"title": "Song A", "artist": "Artist X"}]}"#,
                ),
            })
        });

        let mut playlists = MockPlaylistStore::new();
        playlists.expect_playlists_for().returning(|_| Ok(vec![]));
        // Only the healthy command reaches playlist creation.
        playlists
            .expect_create()
            .times(1)
            .returning(|_| Ok(crate::ports::library::ItemId::new("playlist-1")));

        let orchestrator = orchestrator(
            vec!["broken", "gen-chart"],
            library_with_song_a(),
            playlists,
            runner,
        )
        .await;
        orchestrator.run(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_generator_process_is_contained() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().times(1).returning(|_, _| {
            Ok(ProcessOutput {
                exit_code: Some(3),
                stdout: String::new(),
                stderr: "chart service down".to_string(),
            })
        });

        let mut playlists = MockPlaylistStore::new();
        playlists.expect_create().times(0);

        let orchestrator = orchestrator(
            vec!["gen-chart"],
            MockMusicLibrary::new(),
            playlists,
            runner,
        )
        .await;
        orchestrator.run(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_batch_aborts() {
        let orchestrator = orchestrator(
            vec!["gen-chart"],
            MockMusicLibrary::new(),
            MockPlaylistStore::new(),
            MockProcessRunner::new(),
        )
        .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(orchestrator.run(&cancel).await.is_err());
    }
}
