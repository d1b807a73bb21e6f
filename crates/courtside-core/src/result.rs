//! Convenience result type alias for the Courtside connection layer.

use crate::error::ClientError;

/// A specialized `Result` type for connection-layer operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, ClientError>` explicitly.
pub type ClientResult<T> = Result<T, ClientError>;
