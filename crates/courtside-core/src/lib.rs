//! # courtside-core
//!
//! Core crate for the Courtside client connection layer. Contains the
//! configuration schemas and the unified error system shared by the
//! credential store, request gateway, and realtime channel crates.
//!
//! This crate has **no** internal dependencies on other Courtside crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::ClientError;
pub use result::ClientResult;
