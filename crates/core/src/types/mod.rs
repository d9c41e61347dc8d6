//! Core types for Stampcard.
//!
//! This module provides type-safe wrappers for the loyalty domain.

pub mod customer;
pub mod customer_id;
pub mod mobile;
pub mod stamps;

pub use customer::Customer;
pub use customer_id::{CustomerId, CustomerIdError};
pub use mobile::{MobileError, MobileNumber};
pub use stamps::{StampCard, StampError, StampUpdate};
