//! The controller owns the model and interprets reducer effects.
//!
//! Messages flow in over a channel and are processed strictly in order; the
//! reducer mutates the model and returns declarative effects, which the
//! controller carries out against the API client and the session poller.
//! Downstream failures never escape: they become notifications or a
//! `SessionClosed` message.

use std::sync::Arc;

use tokio::sync::mpsc;

use fate_table_core::{
    CharacterId, Effect, Message, Model, Notification, Reducer, Scene, SessionId,
};

use crate::api::TableApi;
use crate::error::ApiError;
use crate::poller::{self, PollRole, PollerHandle};

/// Seam for updating the addressable location (`history.pushState` in the
/// browser host).
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// A [`Navigator`] for hosts without addressable locations.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn push(&self, _path: &str) {}
}

/// Drives the model from messages and interprets effects.
pub struct Controller {
    api: Arc<dyn TableApi>,
    navigator: Arc<dyn Navigator>,
    reducer: Reducer,
    model: Model,
    messages: mpsc::UnboundedSender<Message>,
    poller: Option<PollerHandle>,
}

impl Controller {
    /// Create a controller. `messages` must be the sender half of the
    /// channel whose receiver is passed to [`Controller::run`]; the poller
    /// and fire-and-forget mutations report back through it.
    pub fn new(
        api: Arc<dyn TableApi>,
        navigator: Arc<dyn Navigator>,
        messages: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            api,
            navigator,
            reducer: Reducer::new(),
            model: Model::default(),
            messages,
            poller: None,
        }
    }

    /// Use a reducer with a fixed dice seed, for tests.
    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Fetch server version information into the model. Failure is logged
    /// but not fatal; the model keeps its default version info.
    pub async fn load_version_info(&mut self) {
        match self.api.version_info().await {
            Ok(info) => self.model.version_info = info,
            Err(err) => tracing::warn!(error = %err, "version info unavailable"),
        }
    }

    /// Process one message. Returns whether the model changed visibly.
    pub async fn apply(&mut self, message: Message) -> bool {
        if let Message::SessionClosed { ref session_id } = message {
            // A closure signal enqueued by a poller that has since been
            // replaced must not tear down the session that replaced it.
            if self
                .poller
                .as_ref()
                .is_some_and(|handle| handle.session_id() != session_id)
            {
                tracing::debug!(session = %session_id, "closure for an inactive session ignored");
                return false;
            }
            self.stop_polling();
        }

        let result = self.reducer.reduce(&mut self.model, message);
        for effect in result.effects {
            self.handle_effect(effect).await;
        }
        result.changed
    }

    /// Process messages until the channel closes, invoking `on_change`
    /// whenever the model changed visibly.
    pub async fn run<F>(mut self, mut messages: mpsc::UnboundedReceiver<Message>, mut on_change: F)
    where
        F: FnMut(&Model),
    {
        while let Some(message) = messages.recv().await {
            if self.apply(message).await {
                on_change(&self.model);
            }
        }
    }

    async fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::CreateSession { title } => {
                self.stop_polling();
                match self.api.create_session(&title).await {
                    Ok(session_id) => {
                        self.navigator.push(&format!("/session/{session_id}"));
                        self.start_polling(session_id, PollRole::Gamemaster);
                    }
                    Err(err) => self.notify_failure("Creating the session failed", err),
                }
            }

            Effect::JoinSession { session_id, name } => {
                self.stop_polling();
                match self.api.create_character(&session_id, &name).await {
                    Ok(character_id) => {
                        self.navigator.push(&format!("/session/{session_id}"));
                        self.start_polling(session_id, PollRole::Player { character_id });
                    }
                    Err(err) => self.notify_failure("Joining the session failed", err),
                }
            }

            Effect::RejoinSession { session_id } => {
                self.stop_polling();
                match self.resolve_role(&session_id).await {
                    Ok(role) => self.start_polling(session_id, role),
                    Err(err) => {
                        tracing::warn!(session = %session_id, error = %err, "rejoin failed");
                        self.navigator.push("/");
                        let _ = self.messages.send(Message::ReplaceScene(Scene::home()));
                    }
                }
            }

            Effect::UpdateFatePoints {
                character_id,
                delta,
            } => {
                let Some(session_id) = self.active_session() else {
                    return;
                };
                let api = Arc::clone(&self.api);
                let messages = self.messages.clone();
                tokio::spawn(async move {
                    if let Err(err) = api
                        .update_fate_points(&session_id, &character_id, delta)
                        .await
                    {
                        notify(&messages, "Updating fate points failed", err);
                    }
                });
            }

            Effect::SpendFatePoint { character_id } => {
                let Some(session_id) = self.active_session() else {
                    return;
                };
                let api = Arc::clone(&self.api);
                let messages = self.messages.clone();
                tokio::spawn(async move {
                    if let Err(err) = api.update_fate_points(&session_id, &character_id, -1).await {
                        notify(&messages, "Spending the fate point failed", err);
                    }
                });
            }

            Effect::AddAspect { name, target } => {
                let Some(session_id) = self.active_session() else {
                    return;
                };
                let api = Arc::clone(&self.api);
                let messages = self.messages.clone();
                tokio::spawn(async move {
                    let result = match target {
                        Some(character_id) => {
                            api.create_character_aspect(&session_id, &character_id, &name)
                                .await
                                .map(|_| ())
                        }
                        None => api
                            .create_session_aspect(&session_id, &name)
                            .await
                            .map(|_| ()),
                    };
                    if let Err(err) = result {
                        notify(&messages, "Adding the aspect failed", err);
                    }
                });
            }

            Effect::RemoveAspect { aspect_id } => {
                let Some(session_id) = self.active_session() else {
                    return;
                };
                let api = Arc::clone(&self.api);
                let messages = self.messages.clone();
                tokio::spawn(async move {
                    if let Err(err) = api.delete_aspect(&session_id, &aspect_id).await {
                        notify(&messages, "Removing the aspect failed", err);
                    }
                });
            }
        }
    }

    /// Resolve the caller's role in a session by matching the authenticated
    /// user against the session's owner and character owners.
    async fn resolve_role(&self, session_id: &SessionId) -> Result<PollRole, ApiError> {
        let auth = self.api.authentication_info().await?;
        let dto = self.api.session(session_id).await?;

        if dto.owner_id == auth.user_id.as_str() {
            return Ok(PollRole::Gamemaster);
        }
        if let Some(character) = dto
            .characters
            .iter()
            .find(|c| c.owner_id == auth.user_id.as_str())
        {
            return Ok(PollRole::Player {
                character_id: CharacterId::from(character.id.as_str()),
            });
        }
        Err(ApiError::Unauthorized)
    }

    fn active_session(&self) -> Option<SessionId> {
        self.poller.as_ref().map(|p| p.session_id().clone())
    }

    fn start_polling(&mut self, session_id: SessionId, role: PollRole) {
        // Invariant: never two pollers at once.
        self.stop_polling();
        self.poller = Some(poller::start(
            Arc::clone(&self.api),
            session_id,
            role,
            self.messages.clone(),
        ));
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            tracing::debug!(session = %handle.session_id(), "polling stopped");
            handle.cancel();
        }
    }

    fn notify_failure(&self, what: &str, err: ApiError) {
        notify(&self.messages, what, err);
    }
}

fn notify(messages: &mpsc::UnboundedSender<Message>, what: &str, err: ApiError) {
    tracing::warn!(error = %err, "{what}");
    let _ = messages.send(Message::PostNotification(vec![Notification::error(
        format!("{what}: {err}"),
    )]));
}
