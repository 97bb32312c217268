//! Shared constants for docsite.

pub mod app;
pub mod env;
pub mod feedback;
