//! Input declaration loading and validation.
//!
//! The input is a single YAML file describing the local router
//! ([`GlobalConfig`]) and a map of peering sessions ([`PeerConfig`]). The
//! full graph is built once per run, mutated in place during enrichment,
//! consumed by rendering, and discarded at process exit; derived fields are
//! never written back to the input.

mod model;
mod operations;
mod types;

#[cfg(test)]
mod tests;

pub use model::{GlobalConfig, PeerConfig, VrrpConfig};
pub use types::{SessionType, VrrpState};
