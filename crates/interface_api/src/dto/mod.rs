//! Request and response bodies

pub mod settlement;
