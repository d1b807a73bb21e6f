//! # courtside-credentials
//!
//! The durable credential store for the Courtside client. Holds the
//! current access/refresh token pair behind a synchronously-readable
//! cache, with a pluggable backend for the persisted copy.
//!
//! The store is the single source of truth for session validity: the
//! request gateway rotates the pair on refresh, and the realtime channel
//! reads the current access token when (re)connecting. The two never
//! talk to each other directly.

pub mod backend;
pub mod credential;
pub mod store;

pub use backend::{CredentialBackend, FileCredentialBackend, MemoryCredentialBackend};
pub use credential::Credential;
pub use store::CredentialStore;
