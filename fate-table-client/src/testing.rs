//! In-memory test doubles.
//!
//! [`FakeTableApi`] implements [`TableApi`] against a mutable in-memory
//! session store, so mutations become visible to subsequent fetches the same
//! way they do against the real server. Fetches can be delayed or scripted
//! to fail, and every call is recorded for assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::{sleep, Duration, Instant};

use fate_table_core::{AspectId, CharacterId, SessionId, UserId, VersionInfo};

use crate::api::{AspectDto, CharacterDto, SessionDto, TableApi};
use crate::auth::AuthenticationInfo;
use crate::controller::Navigator;
use crate::error::ApiError;

/// One recorded mutation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    FatePoints {
        session: String,
        character: String,
        delta: i32,
    },
    SessionAspect {
        session: String,
        name: String,
    },
    CharacterAspect {
        session: String,
        character: String,
        name: String,
    },
    RemoveAspect {
        session: String,
        aspect: String,
    },
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, SessionDto>,
    /// Scripted fetch outcomes, consumed before the stored sessions.
    script: VecDeque<Result<SessionDto, ApiError>>,
    fetches: Vec<(String, Instant)>,
    mutations: Vec<MutationRecord>,
    fetch_delay: Option<Duration>,
    fail_mutations: bool,
    next_id: u32,
}

/// A [`TableApi`] backed by in-memory sessions.
pub struct FakeTableApi {
    user_id: String,
    inner: Mutex<Inner>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTableApi {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            inner: Mutex::new(Inner::default()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn sample_session(id: &str, title: &str, owner: &str) -> SessionDto {
        SessionDto {
            id: id.to_string(),
            title: title.to_string(),
            owner_id: owner.to_string(),
            characters: Vec::new(),
            aspects: Vec::new(),
        }
    }

    pub fn sample_character(id: &str, name: &str, owner: &str, fate_points: u32) -> CharacterDto {
        CharacterDto {
            id: id.to_string(),
            name: name.to_string(),
            owner_id: owner.to_string(),
            fate_points,
            aspects: Vec::new(),
        }
    }

    /// Seed (or replace) a stored session.
    pub fn put_session(&self, session: SessionDto) {
        let mut inner = self.lock();
        inner.sessions.insert(session.id.clone(), session);
    }

    /// Make every fetch take this long.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.lock().fetch_delay = Some(delay);
    }

    /// Script the outcome of the next fetch. Scripted outcomes are consumed
    /// in order before the stored sessions are consulted.
    pub fn push_response(&self, response: Result<SessionDto, ApiError>) {
        self.lock().script.push_back(response);
    }

    /// Make every subsequent mutation fail.
    pub fn fail_mutations(&self) {
        self.lock().fail_mutations = true;
    }

    /// Every fetch so far, as (session id, start time).
    pub fn fetches(&self) -> Vec<(String, Instant)> {
        self.lock().fetches.clone()
    }

    /// Every mutation call so far, in order.
    pub fn mutations(&self) -> Vec<MutationRecord> {
        self.lock().mutations.clone()
    }

    /// The highest number of fetches that were ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake api poisoned")
    }

    fn fresh_id(inner: &mut Inner, prefix: &str) -> String {
        inner.next_id += 1;
        format!("{prefix}-{}", inner.next_id)
    }

    fn record_mutation(&self, record: MutationRecord) -> Result<(), ApiError> {
        let mut inner = self.lock();
        if inner.fail_mutations {
            return Err(ApiError::Transient("mutation rejected".into()));
        }
        inner.mutations.push(record);
        Ok(())
    }
}

#[async_trait]
impl TableApi for FakeTableApi {
    async fn create_session(&self, title: &str) -> Result<SessionId, ApiError> {
        let mut inner = self.lock();
        let id = Self::fresh_id(&mut inner, "session");
        inner.sessions.insert(
            id.clone(),
            SessionDto {
                id: id.clone(),
                title: title.to_string(),
                owner_id: self.user_id.clone(),
                characters: Vec::new(),
                aspects: Vec::new(),
            },
        );
        Ok(SessionId::from(id))
    }

    async fn create_character(
        &self,
        session_id: &SessionId,
        name: &str,
    ) -> Result<CharacterId, ApiError> {
        let mut inner = self.lock();
        let id = Self::fresh_id(&mut inner, "char");
        let owner = self.user_id.clone();
        let session = inner
            .sessions
            .get_mut(session_id.as_str())
            .ok_or(ApiError::NotFound)?;
        session.characters.push(CharacterDto {
            id: id.clone(),
            name: name.to_string(),
            owner_id: owner,
            fate_points: 0,
            aspects: Vec::new(),
        });
        Ok(CharacterId::from(id))
    }

    async fn session(&self, session_id: &SessionId) -> Result<SessionDto, ApiError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.max_in_flight
            .fetch_max(self.in_flight.load(Ordering::SeqCst), Ordering::SeqCst);

        let (delay, outcome) = {
            let mut inner = self.lock();
            let now = Instant::now();
            inner.fetches.push((session_id.to_string(), now));
            let outcome = match inner.script.pop_front() {
                Some(scripted) => scripted,
                None => inner
                    .sessions
                    .get(session_id.as_str())
                    .cloned()
                    .ok_or(ApiError::NotFound),
            };
            (inner.fetch_delay, outcome)
        };

        if let Some(delay) = delay {
            sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn update_fate_points(
        &self,
        session_id: &SessionId,
        character_id: &CharacterId,
        delta: i32,
    ) -> Result<(), ApiError> {
        self.record_mutation(MutationRecord::FatePoints {
            session: session_id.to_string(),
            character: character_id.to_string(),
            delta,
        })?;
        let mut inner = self.lock();
        if let Some(session) = inner.sessions.get_mut(session_id.as_str()) {
            if let Some(character) = session
                .characters
                .iter_mut()
                .find(|c| c.id == character_id.as_str())
            {
                character.fate_points = character.fate_points.saturating_add_signed(delta);
            }
        }
        Ok(())
    }

    async fn create_session_aspect(
        &self,
        session_id: &SessionId,
        name: &str,
    ) -> Result<AspectId, ApiError> {
        self.record_mutation(MutationRecord::SessionAspect {
            session: session_id.to_string(),
            name: name.to_string(),
        })?;
        let mut inner = self.lock();
        let id = Self::fresh_id(&mut inner, "aspect");
        if let Some(session) = inner.sessions.get_mut(session_id.as_str()) {
            session.aspects.push(AspectDto {
                id: id.clone(),
                name: name.to_string(),
            });
        }
        Ok(AspectId::from(id))
    }

    async fn create_character_aspect(
        &self,
        session_id: &SessionId,
        character_id: &CharacterId,
        name: &str,
    ) -> Result<AspectId, ApiError> {
        self.record_mutation(MutationRecord::CharacterAspect {
            session: session_id.to_string(),
            character: character_id.to_string(),
            name: name.to_string(),
        })?;
        let mut inner = self.lock();
        let id = Self::fresh_id(&mut inner, "aspect");
        if let Some(session) = inner.sessions.get_mut(session_id.as_str()) {
            if let Some(character) = session
                .characters
                .iter_mut()
                .find(|c| c.id == character_id.as_str())
            {
                character.aspects.push(AspectDto {
                    id: id.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(AspectId::from(id))
    }

    async fn delete_aspect(
        &self,
        session_id: &SessionId,
        aspect_id: &AspectId,
    ) -> Result<(), ApiError> {
        self.record_mutation(MutationRecord::RemoveAspect {
            session: session_id.to_string(),
            aspect: aspect_id.to_string(),
        })?;
        let mut inner = self.lock();
        if let Some(session) = inner.sessions.get_mut(session_id.as_str()) {
            session.aspects.retain(|a| a.id != aspect_id.as_str());
            for character in &mut session.characters {
                character.aspects.retain(|a| a.id != aspect_id.as_str());
            }
        }
        Ok(())
    }

    async fn authentication_info(&self) -> Result<AuthenticationInfo, ApiError> {
        Ok(AuthenticationInfo {
            user_id: UserId::from(self.user_id.as_str()),
            expires: "2038-01-19T03:14:07Z".to_string(),
        })
    }

    async fn version_info(&self) -> Result<VersionInfo, ApiError> {
        Ok(VersionInfo {
            version: "0.0.0-test".to_string(),
            commit: "0000000".to_string(),
        })
    }
}

/// A [`Navigator`] that records pushed paths.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    paths: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().expect("navigator poisoned").clone()
    }
}

impl Navigator for MemoryNavigator {
    fn push(&self, path: &str) {
        self.paths
            .lock()
            .expect("navigator poisoned")
            .push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mutations_show_up_in_later_fetches() {
        let api = FakeTableApi::new("u1");
        let session_id = api.create_session("Game Night").await.unwrap();
        let character_id = api.create_character(&session_id, "Cynere").await.unwrap();

        api.update_fate_points(&session_id, &character_id, 2)
            .await
            .unwrap();
        api.create_session_aspect(&session_id, "Fog").await.unwrap();

        let dto = api.session(&session_id).await.unwrap();
        assert_eq!(dto.characters[0].fate_points, 2);
        assert_eq!(dto.aspects[0].name, "Fog");
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let api = FakeTableApi::new("u1");
        let result = api.session(&SessionId::from("nope")).await;
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn scripted_responses_are_consumed_in_order() {
        let api = FakeTableApi::new("u1");
        api.put_session(FakeTableApi::sample_session("s1", "Game Night", "u1"));
        api.push_response(Err(ApiError::Transient("boom".into())));

        let id = SessionId::from("s1");
        assert!(api.session(&id).await.is_err());
        assert!(api.session(&id).await.is_ok());
    }
}
