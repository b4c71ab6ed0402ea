//! Core types and workflow logic for the Muster session service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod catalog;
pub mod changelog;
pub mod check;
pub mod diff;
pub mod error;
pub mod person;
pub mod session;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
