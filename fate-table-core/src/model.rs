//! Application data model: sessions, players, aspects, scenes and the
//! top-level [`Model`] the renderer draws from.
//!
//! Everything here is a plain value type. The server owns the authoritative
//! session state; the model only ever holds the latest fetched snapshot.

use std::fmt;

use crate::dice::RollResult;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw server-assigned identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

id_type!(
    /// Identifier of a session (a shared game table).
    SessionId
);
id_type!(
    /// Identifier of a character joined to a session.
    CharacterId
);
id_type!(
    /// Identifier of an aspect, shared or personal.
    AspectId
);
id_type!(
    /// Identifier of an authenticated user.
    UserId
);

/// Visual style of a notification banner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotificationStyle {
    #[default]
    Info,
    Error,
}

/// A transient message surfaced to the user for a single render cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub content: String,
    pub style: NotificationStyle,
}

impl Notification {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: NotificationStyle::Info,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: NotificationStyle::Error,
        }
    }
}

/// A short narrative tag attached to the session or to a single player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aspect {
    pub id: AspectId,
    pub name: String,
}

/// A player character joined to a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: CharacterId,
    pub name: String,
    /// Whether this player is the viewing identity.
    pub is_self: bool,
    pub fate_points: u32,
    pub aspects: Vec<Aspect>,
}

/// The latest snapshot of a shared game table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub gamemaster_id: UserId,
    pub players: Vec<Player>,
    pub aspects: Vec<Aspect>,
}

impl Session {
    /// The player marked as the viewing identity, if any.
    pub fn self_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_self)
    }

    pub fn find_player(&self, id: &CharacterId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }
}

/// Version information reported by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub commit: String,
}

/// What the user is currently looking at.
#[derive(Clone, Debug, PartialEq)]
pub enum Scene {
    /// The landing scene; optionally pre-filled with a session to join.
    Home {
        join_session_id: Option<SessionId>,
        result: Option<RollResult>,
    },
    /// Viewing a session as its gamemaster.
    Gamemaster {
        session: Session,
        result: Option<RollResult>,
    },
    /// Viewing a session as a joined player character.
    PlayerCharacter {
        session: Session,
        result: Option<RollResult>,
    },
}

impl Scene {
    /// The default landing scene.
    pub fn home() -> Self {
        Scene::Home {
            join_session_id: None,
            result: None,
        }
    }

    /// The session this scene views, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Scene::Home { .. } => None,
            Scene::Gamemaster { session, .. } | Scene::PlayerCharacter { session, .. } => {
                Some(session)
            }
        }
    }

    pub fn is_gamemaster(&self) -> bool {
        matches!(self, Scene::Gamemaster { .. })
    }

    pub fn is_player_character(&self) -> bool {
        matches!(self, Scene::PlayerCharacter { .. })
    }

    /// The viewing player's character, when this is a player scene.
    pub fn self_player(&self) -> Option<&Player> {
        match self {
            Scene::PlayerCharacter { session, .. } => session.self_player(),
            _ => None,
        }
    }

    /// The last roll result shown in this scene, if any.
    pub fn result(&self) -> Option<&RollResult> {
        match self {
            Scene::Home { result, .. }
            | Scene::Gamemaster { result, .. }
            | Scene::PlayerCharacter { result, .. } => result.as_ref(),
        }
    }

    /// The same scene with a fresh roll result.
    pub fn with_result(self, new: RollResult) -> Self {
        match self {
            Scene::Home {
                join_session_id, ..
            } => Scene::Home {
                join_session_id,
                result: Some(new),
            },
            Scene::Gamemaster { session, .. } => Scene::Gamemaster {
                session,
                result: Some(new),
            },
            Scene::PlayerCharacter { session, .. } => Scene::PlayerCharacter {
                session,
                result: Some(new),
            },
        }
    }
}

/// Everything the renderer needs: the current scene plus notifications that
/// live for at most one render cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub version_info: VersionInfo,
    pub scene: Scene,
    pub notifications: Vec<Notification>,
}

impl Model {
    pub fn new(version_info: VersionInfo, scene: Scene) -> Self {
        Self {
            version_info,
            scene,
            notifications: Vec::new(),
        }
    }

    /// Drop notifications that have been surfaced once.
    pub fn prune_notifications(&mut self) {
        self.notifications.clear();
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(VersionInfo::default(), Scene::home())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            id: SessionId::from("s1"),
            title: "Game Night".into(),
            gamemaster_id: UserId::from("u1"),
            players: vec![
                Player {
                    id: CharacterId::from("c1"),
                    name: "Cynere".into(),
                    is_self: true,
                    fate_points: 2,
                    aspects: vec![],
                },
                Player {
                    id: CharacterId::from("c2"),
                    name: "Landon".into(),
                    is_self: false,
                    fate_points: 4,
                    aspects: vec![],
                },
            ],
            aspects: vec![],
        }
    }

    #[test]
    fn self_player_matches_flag() {
        let s = session();
        assert_eq!(s.self_player().map(|p| p.name.as_str()), Some("Cynere"));
    }

    #[test]
    fn find_player_by_id() {
        let s = session();
        assert_eq!(
            s.find_player(&CharacterId::from("c2")).map(|p| p.name.as_str()),
            Some("Landon")
        );
        assert!(s.find_player(&CharacterId::from("nope")).is_none());
    }

    #[test]
    fn scene_self_player_only_for_player_character() {
        let gm = Scene::Gamemaster {
            session: session(),
            result: None,
        };
        assert!(gm.self_player().is_none());

        let pc = Scene::PlayerCharacter {
            session: session(),
            result: None,
        };
        assert_eq!(pc.self_player().map(|p| p.name.as_str()), Some("Cynere"));
    }

    #[test]
    fn prune_clears_notifications() {
        let mut model = Model::default();
        model.notifications.push(Notification::info("hello"));
        model.prune_notifications();
        assert!(model.notifications.is_empty());
    }
}
