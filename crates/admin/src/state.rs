//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CustomerStore;
use crate::services::LoyaltyService;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    loyalty: LoyaltyService,
}

impl AppState {
    /// Create state around a configured loyalty service.
    #[must_use]
    pub fn new(loyalty: LoyaltyService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { loyalty }),
        }
    }

    /// The loyalty service.
    #[must_use]
    pub fn loyalty(&self) -> &LoyaltyService {
        &self.inner.loyalty
    }

    /// The customer store behind the service.
    #[must_use]
    pub fn store(&self) -> &dyn CustomerStore {
        self.inner.loyalty.store()
    }
}
