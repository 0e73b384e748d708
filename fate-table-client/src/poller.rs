//! The session poller keeps the rendered scene eventually consistent with
//! server state.
//!
//! Lifecycle per active session: one immediate fetch, then a fixed-interval
//! timer. A tick that fires while a fetch is still in flight is skipped
//! entirely, never queued, so at most one fetch per session is outstanding
//! at any time. Failed fetches are retried with a linearly increasing delay
//! up to a fixed ceiling; a missing session (`NotFound`) is terminal and is
//! never retried. Both exhausted retries and `NotFound` emit
//! [`Message::SessionClosed`] and end the poller.
//!
//! [`PollerHandle::cancel`] (or dropping the handle) aborts the driving task
//! outright, guaranteeing that no further fetches target the old session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use fate_table_core::{CharacterId, Message, Scene, SessionId};

use crate::api::{SessionDto, TableApi};
use crate::error::ApiError;

/// Delay between successive refreshes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum fetch attempts per refresh cycle.
pub const MAX_TRIES: u32 = 5;

/// Growth step of the retry delay: 200ms, 400ms, 600ms, ...
pub const RETRY_DELAY_STEP: Duration = Duration::from_millis(200);

/// The role scenes are built for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollRole {
    Gamemaster,
    Player { character_id: CharacterId },
}

/// A running poller. Exactly one may exist per controller; starting a new
/// one requires cancelling the old one first.
pub struct PollerHandle {
    session_id: SessionId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Stop polling. No fetch is issued after this returns.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Start polling `session_id`, emitting [`Message::ReplaceScene`] on every
/// successful refresh and [`Message::SessionClosed`] once on closure.
pub fn start(
    api: Arc<dyn TableApi>,
    session_id: SessionId,
    role: PollRole,
    messages: mpsc::UnboundedSender<Message>,
) -> PollerHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let id = session_id.clone();

    let task = tokio::spawn(async move {
        poll_loop(api, id, role, messages, token).await;
    });

    PollerHandle {
        session_id,
        cancel,
        task,
    }
}

async fn poll_loop(
    api: Arc<dyn TableApi>,
    session_id: SessionId,
    role: PollRole,
    messages: mpsc::UnboundedSender<Message>,
    token: CancellationToken,
) {
    let mut timer = interval(POLL_INTERVAL);
    // Ticks that pass while a refresh is in flight are dropped, not queued.
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = timer.tick() => {}
        }

        let outcome = tokio::select! {
            _ = token.cancelled() => return,
            outcome = refresh(api.as_ref(), &session_id, &role) => outcome,
        };

        match outcome {
            Ok(scene) => {
                if messages.send(Message::ReplaceScene(scene)).is_err() {
                    return;
                }
            }
            Err(err) => {
                // Exhausted retries are treated the same as a deleted
                // session: assume it is gone and return home.
                tracing::info!(session = %session_id, error = %err, "session closed");
                let _ = messages.send(Message::SessionClosed { session_id });
                return;
            }
        }
    }
}

/// One refresh cycle: fetch with up to [`MAX_TRIES`] attempts.
async fn refresh(
    api: &dyn TableApi,
    session_id: &SessionId,
    role: &PollRole,
) -> Result<Scene, ApiError> {
    let mut attempt = 1;
    loop {
        match api.session(session_id).await {
            Ok(dto) => return Ok(build_scene(dto, role)),
            // A missing session is terminal, never retried.
            Err(ApiError::NotFound) => return Err(ApiError::NotFound),
            Err(err) if attempt < MAX_TRIES => {
                let delay = RETRY_DELAY_STEP * attempt;
                tracing::debug!(
                    session = %session_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "session fetch failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn build_scene(dto: SessionDto, role: &PollRole) -> Scene {
    match role {
        PollRole::Gamemaster => Scene::Gamemaster {
            session: dto.into_session(None),
            result: None,
        },
        PollRole::Player { character_id } => Scene::PlayerCharacter {
            session: dto.into_session(Some(character_id)),
            result: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTableApi;
    use tokio::time::{advance, Instant};

    fn channel() -> (
        mpsc::UnboundedSender<Message>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        mpsc::unbounded_channel()
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_is_immediate_and_builds_role_scene() {
        let api = Arc::new(FakeTableApi::new("u1"));
        api.put_session(FakeTableApi::sample_session("s1", "Game Night", "u1"));
        let (tx, mut rx) = channel();

        let handle = start(api, SessionId::from("s1"), PollRole::Gamemaster, tx);

        let message = rx.recv().await.expect("first poll result");
        let Message::ReplaceScene(Scene::Gamemaster { session, .. }) = message else {
            panic!("expected gamemaster scene");
        };
        assert_eq!(session.title, "Game Night");
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn player_role_marks_viewer_character() {
        let api = Arc::new(FakeTableApi::new("u1"));
        let mut session = FakeTableApi::sample_session("s1", "Game Night", "u1");
        session.characters.push(FakeTableApi::sample_character("c1", "Cynere", "u2", 2));
        api.put_session(session);
        let (tx, mut rx) = channel();

        let handle = start(
            api,
            SessionId::from("s1"),
            PollRole::Player {
                character_id: CharacterId::from("c1"),
            },
            tx,
        );

        let message = rx.recv().await.expect("first poll result");
        let Message::ReplaceScene(Scene::PlayerCharacter { session, .. }) = message else {
            panic!("expected player scene");
        };
        assert!(session.self_player().is_some());
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn at_most_one_fetch_in_flight() {
        let api = Arc::new(FakeTableApi::new("u1"));
        api.put_session(FakeTableApi::sample_session("s1", "Game Night", "u1"));
        // Each fetch takes three poll intervals; ticks in between must be
        // skipped rather than queued.
        api.set_fetch_delay(POLL_INTERVAL * 3);
        let (tx, mut rx) = channel();

        let handle = start(api.clone(), SessionId::from("s1"), PollRole::Gamemaster, tx);

        for _ in 0..3 {
            rx.recv().await.expect("poll result");
        }
        assert_eq!(api.max_in_flight(), 1);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn retry_ceiling_with_linear_delays_then_closed() {
        let api = Arc::new(FakeTableApi::new("u1"));
        for _ in 0..MAX_TRIES {
            api.push_response(Err(ApiError::Transient("boom".into())));
        }
        let (tx, mut rx) = channel();

        let start_time = Instant::now();
        let _handle = start(api.clone(), SessionId::from("s1"), PollRole::Gamemaster, tx);

        assert_eq!(
            rx.recv().await,
            Some(Message::SessionClosed {
                session_id: SessionId::from("s1")
            })
        );
        assert_eq!(rx.recv().await, None);

        let fetches = api.fetches();
        assert_eq!(fetches.len(), MAX_TRIES as usize);

        // First attempt immediate, then 200ms, 400ms, 600ms, 800ms.
        let offsets: Vec<Duration> = fetches.iter().map(|(_, at)| *at - start_time).collect();
        assert_eq!(offsets[0], Duration::ZERO);
        for i in 1..offsets.len() {
            let gap = offsets[i] - offsets[i - 1];
            assert_eq!(gap, RETRY_DELAY_STEP * i as u32);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_closes_without_retrying() {
        let api = Arc::new(FakeTableApi::new("u1"));
        // No stored session: every fetch reports NotFound.
        let (tx, mut rx) = channel();

        let _handle = start(api.clone(), SessionId::from("s1"), PollRole::Gamemaster, tx);

        assert_eq!(
            rx.recv().await,
            Some(Message::SessionClosed {
                session_id: SessionId::from("s1")
            })
        );
        assert_eq!(rx.recv().await, None);
        assert_eq!(api.fetches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_polls_of_unchanged_session_are_structurally_equal() {
        let api = Arc::new(FakeTableApi::new("u1"));
        api.put_session(FakeTableApi::sample_session("s1", "Game Night", "u1"));
        let (tx, mut rx) = channel();

        let handle = start(api, SessionId::from("s1"), PollRole::Gamemaster, tx);

        let first = rx.recv().await.expect("first poll");
        let second = rx.recv().await.expect("second poll");
        assert_eq!(first, second);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_fetching_the_old_session() {
        let api = Arc::new(FakeTableApi::new("u1"));
        api.put_session(FakeTableApi::sample_session("s1", "Game Night", "u1"));
        let (tx, mut rx) = channel();

        let handle = start(api.clone(), SessionId::from("s1"), PollRole::Gamemaster, tx);
        rx.recv().await.expect("first poll");

        handle.cancel();
        let fetches_at_cancel = api.fetches().len();

        advance(POLL_INTERVAL * 5).await;
        assert_eq!(api.fetches().len(), fetches_at_cancel);
    }
}
