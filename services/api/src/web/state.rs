//! services/api/src/web/state.rs
//!
//! Defines the state shared by every request handler.

use linguaverse_core::ports::MessageStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<dyn MessageStore>,
}
