//! Stampcard Core - Shared types and loyalty engine.
//!
//! This crate provides the domain used across all Stampcard components:
//! - `admin` - JSON API for the shop's admin dashboard
//! - `cli` - Command-line tools for migrations and customer management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Every function that depends on time takes the
//! evaluation instant as a parameter.
//!
//! # Modules
//!
//! - [`types`] - Customer id, mobile number, stamp card and customer record
//! - [`report`] - Aggregate statistics over a customer set
//! - [`insights`] - Advisory rules evaluated over a report

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod insights;
pub mod report;
pub mod types;

pub use insights::{Insight, InsightKind};
pub use report::{DashboardStats, LoyaltyReport};
pub use types::*;
