//! Config struct definitions.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Global router configuration, the root of the input declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Local autonomous system number.
    pub asn: u32,

    /// BIRD router ID (dotted quad).
    pub router_id: String,

    /// Directory the generated configs are written to.
    #[serde(default = "default_bird_directory")]
    pub bird_directory: PathBuf,

    /// BIRD control socket used for the `configure` reload command.
    #[serde(default = "default_bird_socket")]
    pub bird_socket: PathBuf,

    /// Base URL of the PeeringDB-compatible API used for peer enrichment.
    #[serde(default = "default_peeringdb_api")]
    pub peeringdb_api: String,

    /// IRRd server (`host:port`) used for AS-SET expansion.
    #[serde(default = "default_irr_server")]
    pub irr_server: String,

    /// Timeout applied to every registry query, in seconds.
    #[serde(default = "default_registry_timeout")]
    pub registry_timeout_secs: u64,

    /// Append-only NDJSON audit log. Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<PathBuf>,

    /// Optional VRRP/keepalived redundancy artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrrp: Option<VrrpConfig>,

    /// Optional operator-facing summary file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_file: Option<PathBuf>,

    /// Peering sessions keyed by declared peer name. Names are unique;
    /// insertion order is irrelevant.
    #[serde(default)]
    pub peers: BTreeMap<String, PeerConfig>,
}

/// One configured BGP peering session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Remote autonomous system number.
    pub asn: u32,

    /// Session type, determining the filtering policy.
    #[serde(default, rename = "type")]
    pub session_type: SessionType,

    /// Neighbor addresses for this session.
    pub neighbors: Vec<String>,

    /// Manually configured AS-SET. When unset, enrichment resolves one
    /// from the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_set: Option<String>,

    /// IPv4 import prefix limit. `None` means unset and eligible for
    /// registry fill; an explicit operator value is never overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_limit4: Option<u32>,

    /// IPv6 import prefix limit, same semantics as `import_limit4`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_limit6: Option<u32>,

    /// Opt out of registry enrichment for this peer.
    #[serde(default)]
    pub no_enrich: bool,

    // ------------------------------------------------------------------
    // Derived fields, recomputed every run. Never part of the persisted
    // declaration and never read back as input.
    // ------------------------------------------------------------------
    /// Sanitized BIRD protocol name, derived from the declared peer name.
    #[serde(skip)]
    pub protocol_name: String,

    /// IPv4 prefix filter expanded from the resolved AS-SET.
    #[serde(skip)]
    pub prefix_set4: Vec<String>,

    /// IPv6 prefix filter expanded from the resolved AS-SET.
    #[serde(skip)]
    pub prefix_set6: Vec<String>,

    /// Timestamp of the last registry enrichment attempt.
    #[serde(skip)]
    pub query_time: Option<String>,
}

impl PeerConfig {
    /// Allow-listed attributes for the per-peer summary log.
    ///
    /// This is an explicit contract: only the fields named here are logged,
    /// so adding a field to the struct never silently widens the log output.
    /// Derived fields (protocol name, prefix sets, query time) are excluded
    /// by construction.
    pub fn summary_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("asn", self.asn.to_string()),
            ("type", self.session_type.to_string()),
            ("neighbors", self.neighbors.join(", ")),
            ("as_set", self.as_set.clone().unwrap_or_default()),
            (
                "import_limit4",
                self.import_limit4.map_or_else(|| "unset".to_string(), |v| v.to_string()),
            ),
            (
                "import_limit6",
                self.import_limit6.map_or_else(|| "unset".to_string(), |v| v.to_string()),
            ),
            ("no_enrich", self.no_enrich.to_string()),
        ]
    }
}

/// VRRP settings for the generated keepalived config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VrrpConfig {
    /// Interface the VRRP instance runs on.
    pub interface: String,

    /// Instance state (master or backup).
    #[serde(default)]
    pub state: VrrpState,

    /// Virtual router ID (1-255).
    pub router_id: u8,

    /// Instance priority.
    #[serde(default = "default_vrrp_priority")]
    pub priority: u8,

    /// Virtual IP addresses, with prefix length (e.g. `192.0.2.1/24`).
    pub vips: Vec<String>,

    /// Where to write the keepalived config.
    #[serde(default = "default_keepalived_config")]
    pub config_path: std::path::PathBuf,
}
