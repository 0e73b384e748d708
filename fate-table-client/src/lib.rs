//! Transport and orchestration for the Fate table client.
//!
//! `fate-table-core` owns the model and the reducer; this crate connects
//! them to a running table server:
//!
//! - [`api`]: the [`api::TableApi`] seam with REST and WebSocket clients
//! - [`auth`]: bearer-token storage and identity info
//! - [`poller`]: the per-session refresh loop with retry and closure
//!   detection
//! - [`controller`]: message processing and effect interpretation
//! - [`location`]: startup route parsing
//!
//! A host wires these together roughly like this:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fate_table_client::api::RestApi;
//! use fate_table_client::auth::MemoryTokenStore;
//! use fate_table_client::controller::{Controller, NoopNavigator};
//! use fate_table_client::location::Route;
//!
//! # async fn host() -> Result<(), fate_table_client::ApiError> {
//! let api = Arc::new(RestApi::connect("https://example.com/api", Arc::new(MemoryTokenStore::new())).await?);
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut controller = Controller::new(api, Arc::new(NoopNavigator), tx.clone());
//! controller.load_version_info().await;
//!
//! if let Some(message) = Route::parse("/session/s1", None).into_message(None) {
//!     let _ = tx.send(message);
//! }
//! controller.run(rx, |model| { /* render */ let _ = model; }).await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod controller;
pub mod error;
pub mod location;
pub mod poller;
pub mod testing;

pub use controller::{Controller, Navigator, NoopNavigator};
pub use error::ApiError;
pub use poller::{PollRole, PollerHandle};
