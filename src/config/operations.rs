//! Config loading and validation.

use super::model::GlobalConfig;
use crate::error::{ForgeError, Result};
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

/// IRR object name grammar accepted for a manually configured AS-SET:
/// either a plain ASN (`AS64496`) or a set name (`AS-EXAMPLE`,
/// `AS64496:AS-CUSTOMERS`).
const AS_SET_PATTERN: &str = r"^(?i)AS[0-9:_-][A-Za-z0-9_:-]*$";

impl GlobalConfig {
    /// Load the declaration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse the declaration from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GlobalConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ForgeError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `asn` must be nonzero, globally and per peer
    /// - `router_id` must be a dotted quad
    /// - `registry_timeout_secs` must be positive
    /// - every peer needs at least one neighbor, and each neighbor must be
    ///   a valid IP address
    /// - a manually configured AS-SET must match the IRR object grammar
    /// - VRRP, when configured, needs a nonzero virtual router ID and at
    ///   least one VIP
    pub fn validate(&self) -> Result<()> {
        if self.asn == 0 {
            return Err(ForgeError::Config(
                "config validation failed: asn must be nonzero".to_string(),
            ));
        }

        if self.router_id.parse::<Ipv4Addr>().is_err() {
            return Err(ForgeError::Config(format!(
                "config validation failed: router_id '{}' is not a dotted quad",
                self.router_id
            )));
        }

        if self.registry_timeout_secs == 0 {
            return Err(ForgeError::Config(
                "config validation failed: registry_timeout_secs must be greater than 0"
                    .to_string(),
            ));
        }

        let as_set_re = Regex::new(AS_SET_PATTERN)
            .map_err(|e| ForgeError::Config(format!("internal AS-SET pattern error: {}", e)))?;

        for (name, peer) in &self.peers {
            if name.is_empty() {
                return Err(ForgeError::Config(
                    "config validation failed: peer names must be non-empty".to_string(),
                ));
            }

            if peer.asn == 0 {
                return Err(ForgeError::Config(format!(
                    "config validation failed: peer '{}' has asn 0",
                    name
                )));
            }

            if peer.neighbors.is_empty() {
                return Err(ForgeError::Config(format!(
                    "config validation failed: peer '{}' has no neighbors",
                    name
                )));
            }

            for neighbor in &peer.neighbors {
                if neighbor.parse::<IpAddr>().is_err() {
                    return Err(ForgeError::Config(format!(
                        "config validation failed: peer '{}' neighbor '{}' is not an IP address",
                        name, neighbor
                    )));
                }
            }

            if let Some(as_set) = &peer.as_set
                && !as_set_re.is_match(as_set)
            {
                return Err(ForgeError::Config(format!(
                    "config validation failed: peer '{}' as_set '{}' is not a valid IRR object name",
                    name, as_set
                )));
            }
        }

        if let Some(vrrp) = &self.vrrp {
            if vrrp.router_id == 0 {
                return Err(ForgeError::Config(
                    "config validation failed: vrrp.router_id must be nonzero".to_string(),
                ));
            }
            if vrrp.vips.is_empty() {
                return Err(ForgeError::Config(
                    "config validation failed: vrrp.vips must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
