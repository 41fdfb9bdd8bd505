//! # idolbase Common Library
//!
//! Shared code for idolbase:
//! - Database schema and connection pool initialization
//! - Configuration loading and root folder resolution
//! - Common error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
