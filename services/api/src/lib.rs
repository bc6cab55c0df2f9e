//! services/api/src/lib.rs
//!
//! The `api` service crate: concrete adapters for the core ports plus the
//! axum web layer. The binaries in `src/bin/` wire everything together.

pub mod adapters;
pub mod config;
pub mod error;
pub mod extract;
pub mod web;
