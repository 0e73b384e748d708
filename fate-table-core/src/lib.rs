//! Domain core of the Fate table client.
//!
//! This crate holds everything that is independent of transport and
//! rendering, following an Elm/Redux-inspired split:
//!
//! - **Model**: sessions, players, aspects, scenes and notifications
//! - **Dice**: the 4dF roll and the ladder mapping
//! - **Message**: the tagged vocabulary of state transitions
//! - **Reducer**: `(Model, Message) -> Reduced`, emitting declarative
//!   [`Effect`]s instead of performing I/O
//!
//! The companion `fate-table-client` crate interprets effects against the
//! REST/WebSocket API and keeps the model fresh through the session poller.
//!
//! # Example
//!
//! ```
//! use fate_table_core::dice::Rating;
//! use fate_table_core::{Message, Model, Reducer};
//!
//! let mut model = Model::default();
//! let mut reducer = Reducer::seeded(42);
//!
//! let result = reducer.reduce(&mut model, Message::RollDice(Rating::new(3).unwrap()));
//! assert!(result.changed);
//! assert!(model.scene.result().is_some());
//! ```

pub mod dice;
pub mod effect;
pub mod message;
pub mod model;
pub mod reducer;

pub use effect::Effect;
pub use message::Message;
pub use model::{
    Aspect, AspectId, CharacterId, Model, Notification, NotificationStyle, Player, Scene, Session,
    SessionId, UserId, VersionInfo,
};
pub use reducer::{Reduced, Reducer};
