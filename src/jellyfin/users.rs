use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::jellyfin::JellyfinClient;
use crate::ports::playlists::AccountId;

#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Policy", default)]
    pub policy: Option<UserPolicyDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPolicyDto {
    #[serde(rename = "IsAdministrator", default)]
    pub is_administrator: bool,
}

impl UserDto {
    fn is_admin(&self) -> bool {
        self.policy.as_ref().is_some_and(|p| p.is_administrator)
    }
}

impl JellyfinClient {
    /// The first account flagged as administrator, in server order.
    ///
    /// Endpoint: `GET /Users`
    pub(crate) async fn first_admin_account(&self) -> Result<Option<AccountId>> {
        let url = self.endpoint("Users")?;
        let users = self
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<UserDto>>()
            .await
            .wrap_err("Failed to deserialize users response")?;

        let admin = users.into_iter().find(UserDto::is_admin);
        if let Some(ref admin) = admin {
            log::debug!("Using administrator account '{}'", admin.name);
        }
        Ok(admin.map(|user| AccountId::new(user.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_admin_picked_in_order() {
        let users: Vec<UserDto> = serde_json::from_str(
            r#"[
                {"Id": "u1", "Name": "guest", "Policy": {"IsAdministrator": false}},
                {"Id": "u2", "Name": "admin", "Policy": {"IsAdministrator": true}},
                {"Id": "u3", "Name": "admin2", "Policy": {"IsAdministrator": true}}
            ]"#,
        )
        .unwrap();

        let admin = users.into_iter().find(UserDto::is_admin).unwrap();
        assert_eq!(admin.id, "u2");
    }

    #[test]
    fn test_user_without_policy_is_not_admin() {
        let user: UserDto = serde_json::from_str(r#"{"Id": "u1", "Name": "guest"}"#).unwrap();
        assert!(!user.is_admin());
    }
}
