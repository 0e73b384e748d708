//! The state-transition function: `(Model, Message) -> Reduced`.
//!
//! The reducer is the single place where the model is mutated. It never
//! performs I/O; everything side-effecting is returned as an [`Effect`] for
//! the controller to interpret. Messages whose role precondition does not
//! hold (gamemaster-only or player-only) are silently ignored.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dice::{self, Rating};
use crate::effect::Effect;
use crate::message::Message;
use crate::model::{Model, Notification, Scene};

/// Result of reducing one message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reduced {
    /// Whether the model changed visibly and a redraw is needed.
    pub changed: bool,
    /// Effects the controller must carry out.
    pub effects: Vec<Effect>,
}

impl Reduced {
    /// No visible change, nothing to do.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// The model changed visibly.
    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: Vec::new(),
        }
    }

    /// Attach an effect to this result.
    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reduces messages into model transitions.
///
/// Owns the dice RNG so that rolls are deterministic under a fixed seed.
pub struct Reducer {
    rng: StdRng,
}

impl Reducer {
    /// A reducer drawing dice from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reducer with a fixed dice seed, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Process one message against the current model.
    pub fn reduce(&mut self, model: &mut Model, message: Message) -> Reduced {
        let name = message.name();
        let result = self.dispatch(model, message);
        tracing::debug!(
            message = name,
            changed = result.changed,
            effects = result.effects.len(),
            "message processed"
        );
        result
    }

    fn dispatch(&mut self, model: &mut Model, message: Message) -> Reduced {
        match message {
            Message::ReplaceScene(scene) => {
                let changed = model.scene != scene || !model.notifications.is_empty();
                model.scene = scene;
                model.prune_notifications();
                if changed {
                    Reduced::changed()
                } else {
                    Reduced::unchanged()
                }
            }

            Message::PostNotification(notifications) => {
                model.notifications.extend(notifications);
                Reduced::changed()
            }

            Message::SessionClosed { .. } => {
                model.scene = Scene::home();
                model.notifications = vec![Notification::info("The session has been closed.")];
                Reduced::changed()
            }

            Message::RollDice(rating) => self.roll_dice(model, rating),

            Message::NewSession { title } => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    model
                        .notifications
                        .push(Notification::error("A session title is required."));
                    return Reduced::changed();
                }
                finish_command(model, Some(Effect::CreateSession { title }))
            }

            Message::JoinAsPlayer { session_id, name } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    model
                        .notifications
                        .push(Notification::error("A character name is required."));
                    return Reduced::changed();
                }
                finish_command(model, Some(Effect::JoinSession { session_id, name }))
            }

            Message::Rejoin { session_id } => {
                finish_command(model, Some(Effect::RejoinSession { session_id }))
            }

            Message::UpdatePlayerFatePoints { player_id, delta } => {
                let effect = if model.scene.is_gamemaster() {
                    Some(Effect::UpdateFatePoints {
                        character_id: player_id,
                        delta,
                    })
                } else {
                    tracing::debug!("update-fate-points ignored outside gamemaster scene");
                    None
                };
                finish_command(model, effect)
            }

            Message::SpendFatePoint => {
                let effect = match model.scene.self_player() {
                    Some(player) if player.fate_points > 0 => Some(Effect::SpendFatePoint {
                        character_id: player.id.clone(),
                    }),
                    Some(_) => {
                        tracing::debug!("spend-fate-point ignored, no fate points left");
                        None
                    }
                    None => {
                        tracing::debug!("spend-fate-point ignored outside player scene");
                        None
                    }
                };
                finish_command(model, effect)
            }

            Message::AddAspect {
                name,
                target_player,
            } => {
                if !model.scene.is_gamemaster() {
                    tracing::debug!("add-aspect ignored outside gamemaster scene");
                    return finish_command(model, None);
                }
                let name = name.trim().to_string();
                if name.is_empty() {
                    model
                        .notifications
                        .push(Notification::error("An aspect name is required."));
                    return Reduced::changed();
                }
                finish_command(
                    model,
                    Some(Effect::AddAspect {
                        name,
                        target: target_player,
                    }),
                )
            }

            Message::RemoveAspect { id } => {
                let effect = if model.scene.is_gamemaster() {
                    Some(Effect::RemoveAspect { aspect_id: id })
                } else {
                    tracing::debug!("remove-aspect ignored outside gamemaster scene");
                    None
                };
                finish_command(model, effect)
            }
        }
    }

    fn roll_dice(&mut self, model: &mut Model, rating: Rating) -> Reduced {
        let scene = std::mem::replace(&mut model.scene, Scene::home());
        model.scene = scene.with_result(dice::roll(rating, &mut self.rng));
        Reduced::changed()
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared epilogue for messages that only cause side effects: notifications
/// that were surfaced in the previous cycle are pruned; without any pending
/// notifications the message causes no visible change.
fn finish_command(model: &mut Model, effect: Option<Effect>) -> Reduced {
    let effects: Vec<Effect> = effect.into_iter().collect();
    if model.notifications.is_empty() {
        Reduced {
            changed: false,
            effects,
        }
    } else {
        model.prune_notifications();
        Reduced {
            changed: true,
            effects,
        }
    }
}
