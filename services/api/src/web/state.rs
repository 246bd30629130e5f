//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use nihongo_core::{
    catalog::Catalog,
    ports::{Delay, TutorResponseService},
    store::{SessionStore, StoreLatency},
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub store: SessionStore,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        tutor: Arc<dyn TutorResponseService>,
        delay: Arc<dyn Delay>,
        latency: StoreLatency,
    ) -> Self {
        Self {
            store: SessionStore::new(Arc::new(catalog), tutor, delay).with_latency(latency),
        }
    }
}
