//! REST implementation of [`TableApi`].
//!
//! Talks to the endpoints under `/api`:
//!
//! - `POST /auth/new` issues (or renews) a bearer token, returned as plain
//!   text
//! - `POST /sessions` / `GET /sessions/{id}` for the session lifecycle
//! - aspect and character sub-resources for mutations
//!
//! Created ids come back as plain-text bodies; session snapshots as JSON.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};

use fate_table_core::{AspectId, CharacterId, SessionId, VersionInfo};

use crate::api::dto::{
    AuthenticationInfoDto, CreateAspectRequest, CreateCharacterRequest, CreateSessionRequest,
    SessionDto, UpdateFatePointsRequest, VersionInfoDto,
};
use crate::api::TableApi;
use crate::auth::{AuthenticationInfo, TokenStore};
use crate::error::ApiError;

const CHARACTER_TYPE_PC: &str = "PC";

/// REST client for the table server, authenticated with a bearer token.
pub struct RestApi {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl RestApi {
    /// Connect to the API rooted at `base` (e.g. `https://host/api`).
    ///
    /// Issues a bearer token on first use; when `store` already holds one it
    /// is sent along so the server renews it instead, keeping the caller's
    /// user identity stable across reconnects within the same tab.
    pub async fn connect(
        base: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let base = base.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::new();

        let mut request = http.post(format!("{base}/auth/new"));
        if let Some(existing) = store.load() {
            request = request.bearer_auth(existing);
        }
        let response = check_status(request.send().await?)?;
        let token = response.text().await?;
        store.store(&token);

        tracing::debug!(base = %base, "api client connected");

        Ok(Self { http, base, token })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base))
            .bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{path}", self.base))
            .bearer_auth(&self.token)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http
            .put(format!("{}{path}", self.base))
            .bearer_auth(&self.token)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.http
            .delete(format!("{}{path}", self.base))
            .bearer_auth(&self.token)
    }

    /// Send a request whose successful response body is a plain-text id.
    async fn created_id(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = check_status(request.send().await?)?;
        Ok(response.text().await?)
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(status))
    }
}

#[async_trait]
impl TableApi for RestApi {
    async fn create_session(&self, title: &str) -> Result<SessionId, ApiError> {
        let id = self
            .created_id(self.post("/sessions").json(&CreateSessionRequest { title }))
            .await?;
        Ok(SessionId::from(id))
    }

    async fn create_character(
        &self,
        session_id: &SessionId,
        name: &str,
    ) -> Result<CharacterId, ApiError> {
        let id = self
            .created_id(
                self.post(&format!("/sessions/{session_id}/characters"))
                    .json(&CreateCharacterRequest {
                        name,
                        kind: CHARACTER_TYPE_PC,
                    }),
            )
            .await?;
        Ok(CharacterId::from(id))
    }

    async fn session(&self, session_id: &SessionId) -> Result<SessionDto, ApiError> {
        let response = check_status(
            self.get(&format!("/sessions/{session_id}")).send().await?,
        )?;
        Ok(response.json().await?)
    }

    async fn update_fate_points(
        &self,
        session_id: &SessionId,
        character_id: &CharacterId,
        delta: i32,
    ) -> Result<(), ApiError> {
        check_status(
            self.put(&format!(
                "/sessions/{session_id}/characters/{character_id}/fatepoints"
            ))
            .json(&UpdateFatePointsRequest {
                fate_points_delta: delta,
            })
            .send()
            .await?,
        )?;
        Ok(())
    }

    async fn create_session_aspect(
        &self,
        session_id: &SessionId,
        name: &str,
    ) -> Result<AspectId, ApiError> {
        let id = self
            .created_id(
                self.post(&format!("/sessions/{session_id}/aspects"))
                    .json(&CreateAspectRequest { name }),
            )
            .await?;
        Ok(AspectId::from(id))
    }

    async fn create_character_aspect(
        &self,
        session_id: &SessionId,
        character_id: &CharacterId,
        name: &str,
    ) -> Result<AspectId, ApiError> {
        let id = self
            .created_id(
                self.post(&format!(
                    "/sessions/{session_id}/characters/{character_id}/aspects"
                ))
                .json(&CreateAspectRequest { name }),
            )
            .await?;
        Ok(AspectId::from(id))
    }

    async fn delete_aspect(
        &self,
        session_id: &SessionId,
        aspect_id: &AspectId,
    ) -> Result<(), ApiError> {
        check_status(
            self.delete(&format!("/sessions/{session_id}/aspects/{aspect_id}"))
                .send()
                .await?,
        )?;
        Ok(())
    }

    async fn authentication_info(&self) -> Result<AuthenticationInfo, ApiError> {
        let response = check_status(self.get("/auth").send().await?)?;
        let dto: AuthenticationInfoDto = response.json().await?;
        Ok(dto.into_info())
    }

    async fn version_info(&self) -> Result<VersionInfo, ApiError> {
        let response = check_status(self.get("/version-info").send().await?)?;
        let dto: VersionInfoDto = response.json().await?;
        Ok(dto.into_version_info())
    }
}
