//! Inbound adapters (driving side).
//!
//! HTTP handlers translate requests into calls on the domain's driving
//! ports and never reach the outbound adapters directly.

pub mod http;
