//! Artifact rendering.
//!
//! A [`TemplateSet`] is an immutable bundle of the templates compiled into
//! the binary. It is constructed once at startup and passed by reference to
//! every stage that renders — there is no process-global template state.
//!
//! Rendering is pure: each `render_*` method returns the full artifact as a
//! `String` and touches nothing on disk. Callers write the buffer through
//! `fs::atomic_write`, so a render failure can never leave a truncated
//! config for BIRD to load.
//!
//! The substitution engine has no loops, so list-valued parts of the model
//! (prefix sets, neighbor sessions, summary rows) are flattened to strings
//! here before substitution.

mod engine;

use crate::config::{GlobalConfig, PeerConfig, VrrpConfig};
use crate::error::{ForgeError, Result};
use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;

/// Immutable bundle of embedded templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSet {
    global: &'static str,
    peer: &'static str,
    session: &'static str,
    vrrp: &'static str,
    ui: &'static str,
}

impl TemplateSet {
    /// The templates compiled into the binary.
    pub fn embedded() -> Self {
        TemplateSet {
            global: include_str!("../../templates/global.tmpl"),
            peer: include_str!("../../templates/peer.tmpl"),
            session: include_str!("../../templates/session.tmpl"),
            vrrp: include_str!("../../templates/vrrp.tmpl"),
            ui: include_str!("../../templates/ui.tmpl"),
        }
    }

    /// A bundle with the peer template replaced, for exercising render
    /// failures in tests.
    #[cfg(test)]
    pub(crate) fn with_peer_template(peer: &'static str) -> Self {
        TemplateSet {
            peer,
            ..Self::embedded()
        }
    }

    /// Render the global `bird.conf` artifact.
    pub fn render_global(&self, config: &GlobalConfig) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("asn".to_string(), config.asn.to_string());
        vars.insert("router_id".to_string(), config.router_id.clone());
        render("global", self.global, &vars)
    }

    /// Render the per-peer artifact: prefix-set defines plus one BGP
    /// protocol block per neighbor.
    pub fn render_peer(&self, peer_name: &str, peer: &PeerConfig) -> Result<String> {
        let mut sessions = String::new();
        for (index, neighbor) in peer.neighbors.iter().enumerate() {
            let mut vars = HashMap::new();
            vars.insert("protocol_name".to_string(), peer.protocol_name.clone());
            vars.insert("index".to_string(), index.to_string());
            vars.insert("peer_name".to_string(), peer_name.to_string());
            vars.insert("neighbor".to_string(), neighbor.clone());
            vars.insert("asn".to_string(), peer.asn.to_string());
            vars.insert("channels".to_string(), channel_block(peer, neighbor));
            sessions.push_str(&render("session", self.session, &vars)?);
            sessions.push('\n');
        }

        let mut vars = HashMap::new();
        vars.insert("peer_name".to_string(), peer_name.to_string());
        vars.insert("asn".to_string(), peer.asn.to_string());
        vars.insert("session_type".to_string(), peer.session_type.to_string());
        vars.insert(
            "as_set".to_string(),
            peer.as_set.clone().unwrap_or_else(|| "none".to_string()),
        );
        vars.insert(
            "query_time".to_string(),
            peer.query_time.clone().unwrap_or_else(|| "never".to_string()),
        );
        vars.insert("filter_defines".to_string(), filter_defines(peer));
        vars.insert("sessions".to_string(), sessions);
        render("peer", self.peer, &vars)
    }

    /// Render the keepalived/VRRP redundancy artifact.
    pub fn render_vrrp(&self, vrrp: &VrrpConfig) -> Result<String> {
        let vips = vrrp
            .vips
            .iter()
            .map(|vip| format!("        {}", vip))
            .collect::<Vec<_>>()
            .join("\n");

        let mut vars = HashMap::new();
        vars.insert("state".to_string(), vrrp.state.to_string());
        vars.insert("interface".to_string(), vrrp.interface.clone());
        vars.insert("vrrp_router_id".to_string(), vrrp.router_id.to_string());
        vars.insert("priority".to_string(), vrrp.priority.to_string());
        vars.insert("vips".to_string(), vips);
        render("vrrp", self.vrrp, &vars)
    }

    /// Render the operator-facing summary artifact.
    pub fn render_ui(
        &self,
        config: &GlobalConfig,
        peers: &BTreeMap<String, PeerConfig>,
        generated_at: &str,
    ) -> Result<String> {
        let peer_rows = peers
            .iter()
            .map(|(name, peer)| {
                format!(
                    "| {} | AS{} | {} | {} | {} | {} |",
                    name,
                    peer.asn,
                    peer.session_type,
                    peer.as_set.as_deref().unwrap_or("none"),
                    peer.prefix_set4.len(),
                    peer.prefix_set6.len(),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut vars = HashMap::new();
        vars.insert("router_id".to_string(), config.router_id.clone());
        vars.insert("asn".to_string(), config.asn.to_string());
        vars.insert("generated_at".to_string(), generated_at.to_string());
        vars.insert("peer_rows".to_string(), peer_rows);
        render("ui", self.ui, &vars)
    }
}

fn render(name: &str, template: &str, vars: &HashMap<String, String>) -> Result<String> {
    engine::substitute(template, vars)
        .map_err(|e| ForgeError::Render(format!("template '{}': {}", name, e)))
}

/// Prefix-set defines for a filtered peer. Empty for session types that
/// import unfiltered (the sets are transient and may legitimately be empty
/// for an `upstream` session).
fn filter_defines(peer: &PeerConfig) -> String {
    if !peer.session_type.requires_filtering() {
        return String::new();
    }

    let mut out = String::new();
    if !peer.prefix_set4.is_empty() {
        out.push_str(&define_block(&v4_define(peer), &peer.prefix_set4));
    }
    if !peer.prefix_set6.is_empty() {
        out.push_str(&define_block(&v6_define(peer), &peer.prefix_set6));
    }
    out
}

fn define_block(name: &str, prefixes: &[String]) -> String {
    let body = prefixes
        .iter()
        .map(|p| format!("    {}", p))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("define {} = [\n{}\n];\n\n", name, body)
}

fn v4_define(peer: &PeerConfig) -> String {
    format!("{}_PFX4", peer.protocol_name)
}

fn v6_define(peer: &PeerConfig) -> String {
    format!("{}_PFX6", peer.protocol_name)
}

/// Channel configuration for one neighbor, by address family.
fn channel_block(peer: &PeerConfig, neighbor: &str) -> String {
    let is_v4 = neighbor.parse::<Ipv4Addr>().is_ok();
    let (family, define, have_filter, limit) = if is_v4 {
        ("ipv4", v4_define(peer), !peer.prefix_set4.is_empty(), peer.import_limit4)
    } else {
        ("ipv6", v6_define(peer), !peer.prefix_set6.is_empty(), peer.import_limit6)
    };

    let import = if !peer.session_type.requires_filtering() {
        "        import all;\n".to_string()
    } else if have_filter {
        format!(
            "        import filter {{\n            if net ~ {} then accept;\n            reject;\n        }};\n",
            define
        )
    } else {
        // Filtered session with nothing expanded in this family: accept
        // nothing rather than everything.
        "        import none;\n".to_string()
    };

    let limit_line = match limit {
        Some(n) => format!("        import limit {} action disable;\n", n),
        None => String::new(),
    };

    format!(
        "    {} {{\n{}{}        export all;\n    }};\n",
        family, import, limit_line
    )
}
