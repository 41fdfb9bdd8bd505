//! idolbase-seed library interface
//!
//! Exposes the seed pipeline and entity persistence for integration testing.

pub mod db;
pub mod seed;
