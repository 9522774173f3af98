use color_eyre::eyre::Result;

use crate::ports::playlists::AccountId;

/// Port trait for resolving the account that owns the generated playlists.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// The first account flagged as administrator, if any exists.
    async fn first_admin(&self) -> Result<Option<AccountId>>;
}
