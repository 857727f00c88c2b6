//! Prefix-filter derivation.
//!
//! Expands a peer's resolved AS-SET into the transient `prefix_set4` /
//! `prefix_set6` fields by recursive registry expansion. The sets are
//! recomputed from the current registry snapshot on every run and never
//! persisted.
//!
//! For `peer` and `downstream` sessions an expansion failure is fatal: a
//! session whose filter could not be built is equivalent to an unfiltered
//! session, and the run must stop rather than generate it. `upstream`
//! sessions are not filtered, so expansion is skipped for them entirely.
//! A peer that opted out (`no_enrich: true`) degrades instead: the failure
//! is logged and the session is generated with empty sets, which renders as
//! `import none`, so the session accepts nothing rather than everything.

use crate::config::PeerConfig;
use crate::error::{ForgeError, Result};
use crate::events::{Event, EventAction, EventLog};
use crate::registry::Registry;
use serde_json::json;
use tracing::{debug, info, warn};

/// Populate a peer's prefix sets from its AS-SET.
pub fn build_prefix_filters(
    peer_name: &str,
    peer: &mut PeerConfig,
    registry: &dyn Registry,
    events: &EventLog,
) -> Result<()> {
    if !peer.session_type.requires_filtering() {
        debug!("[{}] session type '{}' is unfiltered, skipping expansion", peer_name, peer.session_type);
        return Ok(());
    }

    // Guaranteed non-empty by enrichment for filtered session types.
    let as_set = peer.as_set.as_deref().unwrap_or("");
    if as_set.is_empty() {
        return Err(ForgeError::Config(format!(
            "[{}] cannot build prefix filter without an AS-SET",
            peer_name
        )));
    }

    let (prefixes4, prefixes6) = match registry.expand(as_set) {
        Ok(sets) => sets,
        Err(e) if peer.no_enrich => {
            warn!(
                "[{}] expanding AS-SET '{}' failed, generating with empty prefix sets (session will import nothing): {}",
                peer_name, as_set, e
            );
            return Ok(());
        }
        Err(e) => {
            return Err(ForgeError::Config(format!(
                "[{}] expanding AS-SET '{}' failed and session type '{}' requires a filter: {}",
                peer_name, as_set, peer.session_type, e
            )));
        }
    };

    if prefixes4.is_empty() && prefixes6.is_empty() {
        if peer.no_enrich {
            warn!(
                "[{}] AS-SET '{}' expanded to no prefixes, session will import nothing",
                peer_name, as_set
            );
            return Ok(());
        }
        return Err(ForgeError::Config(format!(
            "[{}] AS-SET '{}' expanded to no prefixes in either family",
            peer_name, as_set
        )));
    }

    info!(
        "[{}] expanded {} to {} IPv4 and {} IPv6 prefixes",
        peer_name,
        as_set,
        prefixes4.len(),
        prefixes6.len()
    );
    events.append(
        &Event::new(EventAction::FilterExpanded)
            .with_peer(peer_name)
            .with_details(json!({
                "as_set": as_set,
                "prefixes4": prefixes4.len(),
                "prefixes6": prefixes6.len(),
            })),
    )?;

    peer.prefix_set4 = prefixes4;
    peer.prefix_set6 = prefixes6;
    Ok(())
}
