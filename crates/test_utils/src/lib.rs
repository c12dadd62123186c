//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! Payly settlement test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built members, currencies, and expense scenarios
//! - `builders`: Builder patterns for test expenses
//! - `assertions`: Custom assertion helpers for settlement results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
