//! Wire DTOs for the `/api` endpoints and their conversion into the domain
//! model.
//!
//! The REST payloads use camelCase field names; `is_self` does not exist on
//! the wire and is derived by comparing character ids against the viewer's
//! character id.

use serde::{Deserialize, Serialize};

use fate_table_core::{
    Aspect, AspectId, CharacterId, Player, Session, SessionId, UserId, VersionInfo,
};

use crate::auth::AuthenticationInfo;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AspectDto {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDto {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub fate_points: u32,
    pub aspects: Vec<AspectDto>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub characters: Vec<CharacterDto>,
    pub aspects: Vec<AspectDto>,
}

impl AspectDto {
    fn into_aspect(self) -> Aspect {
        Aspect {
            id: AspectId::from(self.id),
            name: self.name,
        }
    }
}

impl SessionDto {
    /// Convert into the domain model, marking the viewer's own character.
    pub fn into_session(self, viewer: Option<&CharacterId>) -> Session {
        Session {
            id: SessionId::from(self.id),
            title: self.title,
            gamemaster_id: UserId::from(self.owner_id),
            players: self
                .characters
                .into_iter()
                .map(|c| Player {
                    is_self: viewer.is_some_and(|v| v.as_str() == c.id),
                    id: CharacterId::from(c.id),
                    name: c.name,
                    fate_points: c.fate_points,
                    aspects: c.aspects.into_iter().map(AspectDto::into_aspect).collect(),
                })
                .collect(),
            aspects: self
                .aspects
                .into_iter()
                .map(AspectDto::into_aspect)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCharacterRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateAspectRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateFatePointsRequest {
    pub fate_points_delta: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionInfoDto {
    pub version: String,
    pub commit: String,
}

impl VersionInfoDto {
    pub fn into_version_info(self) -> VersionInfo {
        VersionInfo {
            version: self.version,
            commit: self.commit,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthenticationInfoDto {
    pub user_id: String,
    pub expires: String,
}

impl AuthenticationInfoDto {
    pub fn into_info(self) -> AuthenticationInfo {
        AuthenticationInfo {
            user_id: UserId::from(self.user_id),
            expires: self.expires,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION_JSON: &str = r#"{
        "id": "s1",
        "title": "Game Night",
        "ownerId": "u1",
        "characters": [
            {
                "id": "c1",
                "name": "Cynere",
                "ownerId": "u2",
                "fatePoints": 2,
                "aspects": [{"id": "a2", "name": "Cover"}]
            }
        ],
        "aspects": [{"id": "a1", "name": "Fog"}]
    }"#;

    #[test]
    fn session_dto_deserializes_camel_case() {
        let dto: SessionDto = serde_json::from_str(SESSION_JSON).unwrap();
        assert_eq!(dto.owner_id, "u1");
        assert_eq!(dto.characters[0].fate_points, 2);
        assert_eq!(dto.characters[0].aspects[0].name, "Cover");
    }

    #[test]
    fn into_session_marks_viewer() {
        let dto: SessionDto = serde_json::from_str(SESSION_JSON).unwrap();
        let viewer = CharacterId::from("c1");
        let session = dto.into_session(Some(&viewer));

        assert!(session.players[0].is_self);
        assert_eq!(session.self_player().map(|p| p.name.as_str()), Some("Cynere"));
    }

    #[test]
    fn into_session_without_viewer_marks_nobody() {
        let dto: SessionDto = serde_json::from_str(SESSION_JSON).unwrap();
        let session = dto.into_session(None);
        assert!(session.self_player().is_none());
    }

    #[test]
    fn update_fate_points_uses_wire_field_name() {
        let body = serde_json::to_value(UpdateFatePointsRequest {
            fate_points_delta: -1,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"fatePointsDelta": -1}));
    }

    #[test]
    fn create_character_sends_type_pc() {
        let body = serde_json::to_value(CreateCharacterRequest {
            name: "Cynere",
            kind: "PC",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "Cynere", "type": "PC"}));
    }
}
