//! External routing-registry access.
//!
//! The pipeline consumes registries through the narrow [`Registry`] trait:
//! per-ASN metadata lookup (PeeringDB) and AS-SET expansion into originated
//! prefixes (IRRd). Concrete clients live in this module; everything
//! downstream of the trait is registry-agnostic, and tests substitute an
//! in-memory implementation.
//!
//! Every query is bounded by the configured timeout so an unreachable
//! registry cannot stall the run. How a failure is treated is the caller's
//! decision: metadata lookup failure is recoverable per peer, while a failed
//! AS-SET expansion for a filtered session type is fatal (a session without
//! its filter is equivalent to an unfiltered session).

mod irr;
mod peeringdb;

pub use irr::IrrClient;
pub use peeringdb::PeeringDbClient;

use crate::config::GlobalConfig;
use crate::error::{ForgeError, Result};
use std::time::Duration;
use thiserror::Error;

/// A failed registry query. Classification (recoverable vs fatal) happens
/// at the call site, not here.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct RegistryError(pub String);

/// Result type for registry queries.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Per-ASN metadata as published by the peer's registry record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryData {
    /// Advertised IPv4 prefix count, used as an import-limit fallback.
    pub max_prefix4: Option<u32>,
    /// Advertised IPv6 prefix count.
    pub max_prefix6: Option<u32>,
    /// The registry's AS-SET field, verbatim. May be empty, may contain a
    /// space-separated list or a scope-prefixed (`SOURCE::SET`) name; the
    /// enricher normalizes it.
    pub as_set: String,
}

/// The registry capability the pipeline consumes.
pub trait Registry {
    /// Look up per-ASN metadata.
    fn lookup(&self, asn: u32) -> RegistryResult<RegistryData>;

    /// Expand an AS-SET into originated prefixes, one list per address
    /// family.
    fn expand(&self, as_set: &str) -> RegistryResult<(Vec<String>, Vec<String>)>;
}

/// Production registry: PeeringDB for metadata, IRRd for expansion.
pub struct RegistryClient {
    peeringdb: PeeringDbClient,
    irr: IrrClient,
}

impl RegistryClient {
    pub fn from_config(config: &GlobalConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.registry_timeout_secs);
        let peeringdb = PeeringDbClient::new(&config.peeringdb_api, timeout)
            .map_err(|e| ForgeError::Config(format!("registry client setup failed: {}", e)))?;
        let irr = IrrClient::new(&config.irr_server, timeout);
        Ok(RegistryClient { peeringdb, irr })
    }
}

impl Registry for RegistryClient {
    fn lookup(&self, asn: u32) -> RegistryResult<RegistryData> {
        self.peeringdb.lookup(asn)
    }

    fn expand(&self, as_set: &str) -> RegistryResult<(Vec<String>, Vec<String>)> {
        self.irr.expand(as_set)
    }
}
