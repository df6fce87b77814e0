//! # LEME Common Library
//!
//! Shared code for the LEME prediction services including:
//! - Common error type for artifact and configuration loading
//! - Bootstrap configuration (TOML file, priority resolution)
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
