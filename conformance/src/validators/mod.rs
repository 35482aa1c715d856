//! Context validators.

pub mod context;
