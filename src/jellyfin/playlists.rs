use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::jellyfin::JellyfinClient;
use crate::jellyfin::items::ItemsPage;
use crate::ports::library::ItemId;
use crate::ports::playlists::{AccountId, MediaType, PlaylistCreateRequest, PlaylistSummary};

#[derive(Debug, Serialize)]
struct CreatePlaylistBody<'a> {
    #[serde(rename = "Name")]
    name: &'a str,

    #[serde(rename = "Ids")]
    ids: Vec<&'a str>,

    #[serde(rename = "UserId")]
    user_id: &'a str,

    #[serde(rename = "MediaType")]
    media_type: &'static str,

    #[serde(rename = "IsPublic")]
    is_public: bool,
}

#[derive(Debug, Deserialize)]
struct CreatePlaylistResponse {
    #[serde(rename = "Id")]
    id: String,
}

impl JellyfinClient {
    /// Playlists visible to the account.
    ///
    /// Endpoint: `GET /Items?includeItemTypes=Playlist&userId=...`
    pub(crate) async fn playlists_of(&self, owner: &AccountId) -> Result<Vec<PlaylistSummary>> {
        let mut url = self.endpoint("Items")?;
        url.query_pairs_mut()
            .append_pair("includeItemTypes", "Playlist")
            .append_pair("recursive", "true")
            .append_pair("userId", owner.as_str());

        let page = self
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<ItemsPage>()
            .await
            .wrap_err("Failed to deserialize playlist listing response")?;

        Ok(page
            .items
            .into_iter()
            .map(|item| PlaylistSummary {
                id: ItemId::new(item.id),
                name: item.name,
            })
            .collect())
    }

    /// Endpoint: `POST /Playlists`
    pub(crate) async fn create_playlist(&self, request: &PlaylistCreateRequest) -> Result<ItemId> {
        let url = self.endpoint("Playlists")?;
        let body = CreatePlaylistBody {
            name: &request.name,
            ids: request.item_ids.iter().map(ItemId::as_str).collect(),
            user_id: request.owner.as_str(),
            media_type: match request.media_type {
                MediaType::Audio => "Audio",
            },
            is_public: request.public,
        };

        let response = self
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<CreatePlaylistResponse>()
            .await
            .wrap_err("Failed to deserialize playlist creation response")?;

        Ok(ItemId::new(response.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body_wire_shape() {
        let body = CreatePlaylistBody {
            name: "Road Trip",
            ids: vec!["a", "b", "a"],
            user_id: "admin-id",
            media_type: "Audio",
            is_public: true,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["Name"], "Road Trip");
        assert_eq!(json["Ids"].as_array().unwrap().len(), 3);
        assert_eq!(json["MediaType"], "Audio");
        assert_eq!(json["IsPublic"], true);
    }
}
