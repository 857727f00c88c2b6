//! Registry-driven peer enrichment.
//!
//! Fills unset peer attributes from the registry record for the peer's ASN.
//! The policy is explicit-value-wins: anything the operator wrote in the
//! declaration is never overwritten, only gaps are filled. Registry AS-SET
//! fields are free-form in practice, so the resolved value goes through a
//! normalization ladder (first token of a list, strip a `SOURCE::` scope
//! prefix, synthesize `AS<asn>` as last resort) with a warning at each
//! degraded step.
//!
//! A failed lookup is recoverable per peer: the fallback ladder still runs
//! on empty registry data, so one unreachable registry does not block
//! regeneration for unrelated peers. What is never recoverable is a `peer`
//! or `downstream` session finishing enrichment without an AS-SET — that
//! session would be generated unfiltered, so the whole run stops instead.

use crate::config::PeerConfig;
use crate::error::{ForgeError, Result};
use crate::events::{Event, EventAction, EventLog};
use crate::registry::{Registry, RegistryData};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

/// Enrich one peer in place, then enforce the filtering requirement for its
/// session type.
pub fn enrich_peer(
    peer_name: &str,
    peer: &mut PeerConfig,
    registry: &dyn Registry,
    events: &EventLog,
) -> Result<()> {
    if peer.no_enrich {
        debug!("[{}] enrichment opted out", peer_name);
    } else {
        // Stamped on every attempt, whether or not a field changes.
        peer.query_time = Some(Utc::now().to_rfc2822());

        let data = match registry.lookup(peer.asn) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "[{}] registry lookup for AS{} failed, continuing on fallbacks: {}",
                    peer_name, peer.asn, e
                );
                events.append(
                    &Event::new(EventAction::LookupFailed)
                        .with_peer(peer_name)
                        .with_details(json!({"asn": peer.asn, "error": e.to_string()})),
                )?;
                RegistryData::default()
            }
        };

        apply_import_limits(peer_name, peer, &data, events)?;
        resolve_as_set(peer_name, peer, &data, events)?;
    }

    if peer.session_type.requires_filtering() && peer.as_set.as_deref().unwrap_or("").is_empty() {
        return Err(ForgeError::Config(format!(
            "[{}] has no AS-SET and session type '{}' requires filtering",
            peer_name, peer.session_type
        )));
    }

    if !peer.session_type.requires_filtering() && peer.as_set.is_none() {
        // Known safety asymmetry: upstream sessions are generated unfiltered.
        warn!(
            "[{}] upstream session has no AS-SET and will be generated without a prefix filter",
            peer_name
        );
    }

    Ok(())
}

/// Copy registry import limits into unset peer limits. Registry zeroes are
/// treated as absent data, not as a limit of zero.
fn apply_import_limits(
    peer_name: &str,
    peer: &mut PeerConfig,
    data: &RegistryData,
    events: &EventLog,
) -> Result<()> {
    if peer.import_limit4.is_none()
        && let Some(limit) = data.max_prefix4.filter(|n| *n > 0)
    {
        peer.import_limit4 = Some(limit);
        info!(
            "[{}] has no IPv4 import limit configured, setting to {} from registry",
            peer_name, limit
        );
        events.append(
            &Event::new(EventAction::LimitApplied)
                .with_peer(peer_name)
                .with_details(json!({"family": 4, "limit": limit})),
        )?;
    }

    if peer.import_limit6.is_none()
        && let Some(limit) = data.max_prefix6.filter(|n| *n > 0)
    {
        peer.import_limit6 = Some(limit);
        info!(
            "[{}] has no IPv6 import limit configured, setting to {} from registry",
            peer_name, limit
        );
        events.append(
            &Event::new(EventAction::LimitApplied)
                .with_peer(peer_name)
                .with_details(json!({"family": 6, "limit": limit})),
        )?;
    }

    Ok(())
}

/// Resolve the peer's AS-SET from the registry value, unless one was
/// configured manually.
fn resolve_as_set(
    peer_name: &str,
    peer: &mut PeerConfig,
    data: &RegistryData,
    events: &EventLog,
) -> Result<()> {
    if let Some(manual) = &peer.as_set {
        info!("[{}] has manual AS-SET: {}", peer_name, manual);
        events.append(
            &Event::new(EventAction::AsSetManualKept)
                .with_peer(peer_name)
                .with_details(json!({"as_set": manual, "registry_value": data.as_set})),
        )?;
        return Ok(());
    }

    let mut value = data.as_set.trim().to_string();
    let mut reduced = false;

    if value.contains(' ') {
        let first = value.split(' ').next().unwrap_or("").to_string();
        warn!(
            "[{}] registry AS-SET field is a list, selecting first element '{}'",
            peer_name, first
        );
        value = first;
        reduced = true;
    }

    if let Some((scope, rest)) = value.split_once("::") {
        warn!(
            "[{}] registry AS-SET field has scope prefix '{}', using '{}'",
            peer_name, scope, rest
        );
        value = rest.to_string();
        reduced = true;
    }

    if value.is_empty() {
        let synthesized = format!("AS{}", peer.asn);
        warn!(
            "[{}] has no AS-SET in the registry, falling back to {}",
            peer_name, synthesized
        );
        events.append(
            &Event::new(EventAction::AsSetSynthesized)
                .with_peer(peer_name)
                .with_details(json!({"as_set": synthesized})),
        )?;
        peer.as_set = Some(synthesized);
        return Ok(());
    }

    info!("[{}] setting AS-SET to {} from registry", peer_name, value);
    events.append(
        &Event::new(EventAction::AsSetApplied)
            .with_peer(peer_name)
            .with_details(json!({"as_set": value, "reduced": reduced})),
    )?;
    peer.as_set = Some(value);
    Ok(())
}
