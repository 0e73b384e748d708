//! The message vocabulary the reducer understands.
//!
//! Messages are produced by user interactions, by the session poller and by
//! API results. They are processed strictly in the order they are enqueued.

use crate::dice::Rating;
use crate::model::{AspectId, CharacterId, Notification, Scene, SessionId};

/// A single unit of work for the reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Unconditionally replace the current scene.
    ReplaceScene(Scene),

    /// Append notifications without touching the scene.
    PostNotification(Vec<Notification>),

    /// Create a new session; the caller becomes its gamemaster.
    NewSession { title: String },

    /// Re-enter a session whose id is known, resolving the caller's role.
    Rejoin { session_id: SessionId },

    /// Join a session as a named player character.
    JoinAsPlayer { session_id: SessionId, name: String },

    /// Gamemaster only: change a player's fate points by a delta.
    UpdatePlayerFatePoints { player_id: CharacterId, delta: i32 },

    /// Player only: spend one of the viewing character's fate points.
    SpendFatePoint,

    /// Gamemaster only: add an aspect, shared or attached to one player.
    AddAspect {
        name: String,
        target_player: Option<CharacterId>,
    },

    /// Gamemaster only: remove an aspect.
    RemoveAspect { id: AspectId },

    /// Roll four Fate dice against a rating.
    RollDice(Rating),

    /// The named session no longer exists on the server. Carries the id so
    /// a closure signal from an already-replaced poller can be told apart
    /// from one for the active session.
    SessionClosed { session_id: SessionId },
}

impl Message {
    /// Stable name used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Message::ReplaceScene(_) => "replace-scene",
            Message::PostNotification(_) => "post-notification",
            Message::NewSession { .. } => "new-session",
            Message::Rejoin { .. } => "rejoin-session",
            Message::JoinAsPlayer { .. } => "join-character",
            Message::UpdatePlayerFatePoints { .. } => "update-fate-points",
            Message::SpendFatePoint => "spend-fate-point",
            Message::AddAspect { .. } => "add-aspect",
            Message::RemoveAspect { .. } => "remove-aspect",
            Message::RollDice(_) => "roll-dice",
            Message::SessionClosed { .. } => "session-closed",
        }
    }
}
