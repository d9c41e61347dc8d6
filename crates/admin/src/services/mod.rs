//! Business logic services.
//!
//! - `loyalty` - registration, stamping, lookup, reporting and import

pub mod loyalty;

pub use loyalty::{
    DEFAULT_MAX_ID_ATTEMPTS, IdSource, ImportRecord, ImportSummary, LoyaltyError, LoyaltyService,
    ToggleOutcome,
};
