//! Append-only audit log for enrichment and reconciliation decisions.
//!
//! Events are stored in NDJSON format (one JSON object per line) at the
//! path configured by `event_log`; when that setting is absent the log is
//! disabled. Each line records an RFC 3339 timestamp, the action, the actor
//! (`user@host`), the affected peer where applicable, and action-specific
//! details.
//!
//! The log exists so registry-driven changes to a peer's effective
//! configuration (applied limits, resolved AS-SETs, fallbacks) are auditable
//! after the fact, independent of the process log. Appends are suppressed
//! entirely in dry-run mode.

use crate::error::{ForgeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// A registry import limit was applied to an unset peer limit.
    LimitApplied,
    /// A registry AS-SET was applied (possibly after list/scope reduction).
    AsSetApplied,
    /// No usable registry AS-SET; `AS<asn>` was synthesized.
    AsSetSynthesized,
    /// A manually configured AS-SET was retained over the registry value.
    AsSetManualKept,
    /// A registry lookup failed and the peer continued on fallbacks.
    LookupFailed,
    /// An AS-SET was expanded into prefix filters.
    FilterExpanded,
    /// The output directory was reconciled (global + per-peer files).
    TreeReconciled,
    /// BIRD accepted the configure command.
    Reconfigured,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::LimitApplied => write!(f, "limit_applied"),
            EventAction::AsSetApplied => write!(f, "as_set_applied"),
            EventAction::AsSetSynthesized => write!(f, "as_set_synthesized"),
            EventAction::AsSetManualKept => write!(f, "as_set_manual_kept"),
            EventAction::LookupFailed => write!(f, "lookup_failed"),
            EventAction::FilterExpanded => write!(f, "filter_expanded"),
            EventAction::TreeReconciled => write!(f, "tree_reconciled"),
            EventAction::Reconfigured => write!(f, "reconfigured"),
        }
    }
}

/// One audit log record, serialized as a single NDJSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC 3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// Who ran the generator (`user@host`).
    pub actor: String,

    /// Affected peer name, for peer-specific events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,

    /// Action-specific details.
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            peer: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the peer name for this event.
    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ForgeError::Write(format!("failed to serialize event: {}", e)))
    }
}

fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Handle on the audit log. A disabled log swallows appends, so call sites
/// never branch on whether auditing is configured.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        EventLog { path }
    }

    /// A log that drops everything (unconfigured, or dry-run).
    pub fn disabled() -> Self {
        EventLog { path: None }
    }

    /// Append one event. No-op when the log is disabled.
    pub fn append(&self, event: &Event) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let line = event.to_ndjson_line()?;

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ForgeError::Write(format!(
                    "failed to create event log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ForgeError::Write(format!(
                    "failed to open event log '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", line)
            .map_err(|e| ForgeError::Write(format!("failed to append event: {}", e)))?;

        Ok(())
    }
}
