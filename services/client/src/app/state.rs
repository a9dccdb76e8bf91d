//! services/client/src/app/state.rs
//!
//! Defines the shared application state the controllers are built from.

use quiz_core::ports::{AuthService, ContentService, MirrorStorage, TestService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Controllers)
//=========================================================================================

/// The shared application state, created once at startup and handed to every
/// controller. The service fields are already wrapped in their fallbacks.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub tests: Arc<dyn TestService>,
    pub content: Arc<dyn ContentService>,
    pub mirror: Arc<dyn MirrorStorage>,
}
