use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::jellyfin::JellyfinClient;
use crate::ports::library::ItemId;

const SCAN_POLL_INTERVAL: Duration = Duration::from_secs(2);
const LIBRARY_REFRESH_TASK_KEY: &str = "RefreshLibrary";

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledTask {
    #[serde(rename = "Key", default)]
    pub key: String,

    #[serde(rename = "State", default)]
    pub state: String,
}

impl ScheduledTask {
    fn is_running_refresh(&self) -> bool {
        self.key == LIBRARY_REFRESH_TASK_KEY && self.state == "Running"
    }
}

impl JellyfinClient {
    /// Kick off a full library scan.
    ///
    /// Endpoint: `POST /Library/Refresh`
    pub(crate) async fn start_library_refresh(&self) -> Result<()> {
        let url = self.endpoint("Library/Refresh")?;
        self.post(url)
            .send()
            .await?
            .error_for_status()
            .wrap_err("Failed to start library refresh")?;
        Ok(())
    }

    /// Block until the refresh task is no longer running. The first check is
    /// delayed by one poll interval so the task has time to show up as
    /// running at all.
    pub(crate) async fn wait_for_refresh(&self, cancel: &CancellationToken) -> Result<()> {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(eyre!("library rescan cancelled")),
                _ = tokio::time::sleep(SCAN_POLL_INTERVAL) => {}
            }

            if !self.refresh_running().await? {
                log::debug!("Library refresh completed");
                return Ok(());
            }
        }
    }

    /// Endpoint: `GET /ScheduledTasks`
    async fn refresh_running(&self) -> Result<bool> {
        let url = self.endpoint("ScheduledTasks")?;
        let tasks = self
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ScheduledTask>>()
            .await
            .wrap_err("Failed to deserialize scheduled tasks response")?;

        Ok(tasks.iter().any(ScheduledTask::is_running_refresh))
    }

    /// Delete an item (here: a stale playlist) including its storage.
    ///
    /// Endpoint: `DELETE /Items/{id}`
    pub(crate) async fn delete_item_by_id(&self, id: &ItemId) -> Result<()> {
        let url = self.endpoint(&format!("Items/{}", id))?;
        self.delete(url)
            .send()
            .await?
            .error_for_status()
            .wrap_err_with(|| format!("Failed to delete item {}", id))?;
        Ok(())
    }
}
