//! Route parsing for the client's addressable locations.
//!
//! The host hands over the path and fragment of the page location at startup;
//! the resulting [`Route`] maps onto an initial [`Message`]. The `#dev/...`
//! fragments short-circuit into fixture scenes for eyeballing a scene without
//! a server.

use fate_table_core::{
    Aspect, AspectId, CharacterId, Message, Player, Scene, Session, SessionId, UserId,
};

/// What the page location asks for at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/` or anything unrecognized.
    Home,
    /// `/join/{session_id}`: prompt for a name, then join as a character.
    Join { session_id: SessionId },
    /// `/session/{session_id}`: rejoin a session the user already belongs to.
    Session { session_id: SessionId },
    /// `#dev/gamemaster`: a fixture gamemaster scene.
    DevGamemaster,
    /// `#dev/player`: a fixture player scene.
    DevPlayer,
}

impl Route {
    /// Parse a path and optional fragment. Fragments win over paths, keeping
    /// the dev fixtures reachable from any path.
    pub fn parse(path: &str, fragment: Option<&str>) -> Self {
        match fragment {
            Some(f) if f.starts_with("dev/gamemaster") => return Route::DevGamemaster,
            Some(f) if f.starts_with("dev/player") => return Route::DevPlayer,
            _ => {}
        }

        if let Some(id) = non_empty_suffix(path, "/join/") {
            return Route::Join {
                session_id: SessionId::from(id),
            };
        }
        if let Some(id) = non_empty_suffix(path, "/session/") {
            return Route::Session {
                session_id: SessionId::from(id),
            };
        }

        Route::Home
    }

    /// The message to feed the controller for this route.
    ///
    /// `join_name` is the character name the host prompted for; a join route
    /// without a name falls back to showing the home scene with the session
    /// id prefilled.
    pub fn into_message(self, join_name: Option<&str>) -> Option<Message> {
        match self {
            Route::Home => None,
            Route::Join { session_id } => Some(match join_name {
                Some(name) => Message::JoinAsPlayer {
                    session_id,
                    name: name.trim().to_string(),
                },
                None => Message::ReplaceScene(Scene::Home {
                    join_session_id: Some(session_id),
                    result: None,
                }),
            }),
            Route::Session { session_id } => Some(Message::Rejoin { session_id }),
            Route::DevGamemaster => Some(Message::ReplaceScene(Scene::Gamemaster {
                session: fixture_session(false),
                result: None,
            })),
            Route::DevPlayer => Some(Message::ReplaceScene(Scene::PlayerCharacter {
                session: fixture_session(true),
                result: None,
            })),
        }
    }
}

fn non_empty_suffix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    match path.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => Some(rest),
        _ => None,
    }
}

fn fixture_session(viewer_is_cynere: bool) -> Session {
    let aspect = |id: &str, name: &str| Aspect {
        id: AspectId::from(id),
        name: name.to_string(),
    };
    let player = |id: &str, name: &str, is_self: bool, fate_points: u32, aspects: Vec<Aspect>| {
        Player {
            id: CharacterId::from(id),
            name: name.to_string(),
            is_self,
            fate_points,
            aspects,
        }
    };

    Session {
        id: SessionId::from("1"),
        title: "Test Table".to_string(),
        gamemaster_id: UserId::from("1"),
        players: vec![
            player(
                "2",
                "Cynere",
                viewer_is_cynere,
                2,
                vec![aspect("5", "Cover")],
            ),
            player("3", "Landon", false, 4, vec![]),
            player("4", "Zird", false, if viewer_is_cynere { 1 } else { 0 }, vec![]),
        ],
        aspects: vec![aspect("1", "Fog"), aspect("2", "Slippy Grounds")],
    }
}
