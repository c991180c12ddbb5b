use std::sync::Arc;

use crate::storage::Storage;

/// Shared application state. Handlers only ever talk to the storage
/// trait, so tests can swap MongoDB for the in-memory implementation.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}
