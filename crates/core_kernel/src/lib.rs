//! Core Kernel - Foundational types shared by the Payly crates
//!
//! This crate provides the building blocks used across the workspace:
//! - Currency codes with ISO 4217 minor-unit precision
//! - Decimal helpers (rates, tolerant comparison)
//! - Identifiers for members, expenses, and groups

pub mod money;
pub mod identifiers;
pub mod error;

pub use money::{CurrencyCode, CurrencyError, Rate, DEFAULT_CURRENCY};
pub use identifiers::{ExpenseId, GroupId, MemberId};
pub use error::CoreError;
