//! Effects - side effects declared by the reducer.
//!
//! Effects are descriptions of work, not the work itself. The reducer stays
//! synchronous and pure-ish; the controller interprets effects by calling
//! the API client and managing the session poller.

use crate::model::{AspectId, CharacterId, SessionId};

/// Side effects the controller must carry out after a dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Create a session titled `title` and start polling it as gamemaster.
    CreateSession { title: String },

    /// Join `session_id` as a player character named `name` and start
    /// polling.
    JoinSession { session_id: SessionId, name: String },

    /// Resolve the caller's identity for `session_id` and start polling.
    RejoinSession { session_id: SessionId },

    /// Fire-and-forget fate point adjustment for one character.
    UpdateFatePoints {
        character_id: CharacterId,
        delta: i32,
    },

    /// Fire-and-forget spend of one of the viewer's own fate points.
    SpendFatePoint { character_id: CharacterId },

    /// Fire-and-forget aspect creation, shared or targeted at one player.
    AddAspect {
        name: String,
        target: Option<CharacterId>,
    },

    /// Fire-and-forget aspect removal.
    RemoveAspect { aspect_id: AspectId },
}
