//! Utility functions.

pub mod path;
