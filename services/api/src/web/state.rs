//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use gradebook_core::ports::{AuthSessionStore, RecordStore};
use gradebook_core::{CredentialManager, Gradebook};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Holds no per-account data: every handler receives the acting account id
/// from the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn AuthSessionStore>,
    pub credentials: CredentialManager,
    pub gradebook: Gradebook,
}

impl AppState {
    /// Wires the core services onto a single store implementing both ports.
    pub fn new<S>(store: Arc<S>, config: Arc<Config>) -> Self
    where
        S: RecordStore + AuthSessionStore + 'static,
    {
        let records: Arc<dyn RecordStore> = store.clone();
        Self {
            config,
            sessions: store,
            credentials: CredentialManager::new(records.clone()),
            gradebook: Gradebook::new(records),
        }
    }
}
