//! API clients for the table server.
//!
//! [`TableApi`] is the seam the poller and controller talk through; the REST
//! implementation lives in [`rest`], the WebSocket variant in [`ws`]. Tests
//! substitute an in-memory fake (see [`crate::testing`]).

mod dto;
pub mod rest;
pub mod ws;

pub use dto::{AspectDto, CharacterDto, SessionDto};
pub use rest::RestApi;
pub use ws::WsApi;

use async_trait::async_trait;

use fate_table_core::{AspectId, CharacterId, SessionId, VersionInfo};

use crate::auth::AuthenticationInfo;
use crate::error::ApiError;

/// Domain operations against the table server.
///
/// Fetching is the only operation with a meaningful result payload. All
/// mutations are fire-and-forget from the caller's perspective: they do not
/// return the updated session, the next poll makes the change visible.
#[async_trait]
pub trait TableApi: Send + Sync {
    /// Create a session; the authenticated user becomes its gamemaster.
    async fn create_session(&self, title: &str) -> Result<SessionId, ApiError>;

    /// Join a session as a new player character.
    async fn create_character(
        &self,
        session_id: &SessionId,
        name: &str,
    ) -> Result<CharacterId, ApiError>;

    /// Fetch the current session snapshot.
    ///
    /// Returns [`ApiError::NotFound`] when the session no longer exists,
    /// distinctly from transient failures, so the poller can tell "session
    /// closed" from "network hiccup".
    async fn session(&self, session_id: &SessionId) -> Result<SessionDto, ApiError>;

    /// Adjust a character's fate points by a delta.
    async fn update_fate_points(
        &self,
        session_id: &SessionId,
        character_id: &CharacterId,
        delta: i32,
    ) -> Result<(), ApiError>;

    /// Add a shared aspect to the session.
    async fn create_session_aspect(
        &self,
        session_id: &SessionId,
        name: &str,
    ) -> Result<AspectId, ApiError>;

    /// Add an aspect to one player character.
    async fn create_character_aspect(
        &self,
        session_id: &SessionId,
        character_id: &CharacterId,
        name: &str,
    ) -> Result<AspectId, ApiError>;

    /// Remove an aspect, shared or personal.
    async fn delete_aspect(
        &self,
        session_id: &SessionId,
        aspect_id: &AspectId,
    ) -> Result<(), ApiError>;

    /// Identity information behind the current bearer token.
    async fn authentication_info(&self) -> Result<AuthenticationInfo, ApiError>;

    /// Server version information.
    async fn version_info(&self) -> Result<VersionInfo, ApiError>;
}
