use std::sync::Arc;

use user::{MemoryUserStore, UserStore};

pub mod user;

pub mod models {
    pub mod user;
}

pub mod dtos {
    pub mod user;
}

/// Creates the process-wide user store.
///
/// Records live in memory only and are gone once the process exits.
pub fn setup() -> Arc<dyn UserStore> {
    log::info!("Using in-memory user store");
    Arc::new(MemoryUserStore::new())
}
