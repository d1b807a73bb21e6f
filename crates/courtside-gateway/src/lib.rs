//! # courtside-gateway
//!
//! The authenticated request gateway for the Courtside client. Every
//! outbound HTTP call goes through [`RequestGateway::send`], which
//! attaches the current access token and transparently recovers from
//! its expiry exactly once per call via a single-flight refresh.

pub mod descriptor;
pub mod gateway;
mod refresh;

pub use descriptor::RequestDescriptor;
pub use gateway::RequestGateway;
