//! Session and VRRP types plus serde default functions.

use serde::{Deserialize, Serialize};

/// BGP session type, determining the filtering policy a peer receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// Bilateral peering: routes filtered by the peer's AS-SET (default).
    #[default]
    Peer,
    /// Customer session: filtered by AS-SET, routes announced upstream.
    Downstream,
    /// Transit session: full table accepted, no AS-SET filter required.
    Upstream,
}

impl SessionType {
    /// Whether this session type must carry a prefix filter derived from a
    /// non-empty AS-SET. Generating an unfiltered `peer` or `downstream`
    /// session is a security exposure, not a degraded mode.
    pub fn requires_filtering(self) -> bool {
        matches!(self, SessionType::Peer | SessionType::Downstream)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Peer => write!(f, "peer"),
            SessionType::Downstream => write!(f, "downstream"),
            SessionType::Upstream => write!(f, "upstream"),
        }
    }
}

/// VRRP instance state for the keepalived artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VrrpState {
    #[default]
    Master,
    Backup,
}

impl std::fmt::Display for VrrpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // keepalived expects the state keyword uppercased
        match self {
            VrrpState::Master => write!(f, "MASTER"),
            VrrpState::Backup => write!(f, "BACKUP"),
        }
    }
}

// Default value functions for serde

pub(crate) fn default_bird_directory() -> std::path::PathBuf {
    "/etc/bird".into()
}
pub(crate) fn default_bird_socket() -> std::path::PathBuf {
    "/run/bird/bird.ctl".into()
}
pub(crate) fn default_peeringdb_api() -> String {
    "https://www.peeringdb.com/api".to_string()
}
pub(crate) fn default_irr_server() -> String {
    "rr.ntt.net:43".to_string()
}
pub(crate) fn default_registry_timeout() -> u64 {
    10
}
pub(crate) fn default_keepalived_config() -> std::path::PathBuf {
    "/etc/keepalived/keepalived.conf".into()
}
pub(crate) fn default_vrrp_priority() -> u8 {
    100
}
