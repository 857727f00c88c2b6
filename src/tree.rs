//! Generated-directory reconciliation.
//!
//! One full pass per run: write the global artifact, delete every generated
//! per-peer file, write one fresh file per configured peer. The directory is
//! replaced wholesale rather than diffed, so a peer removed from the
//! declaration loses its file on the next run with no bookkeeping.
//!
//! Every artifact is rendered into memory before the first byte of
//! filesystem mutation. A render failure therefore aborts the run with the
//! directory exactly as it was, and each individual write goes through
//! `fs::atomic_write`, so BIRD can never load a truncated file.
//!
//! Dry-run skips the pass after rendering: generation and validation still
//! execute, the filesystem is untouched.

use crate::config::GlobalConfig;
use crate::error::{ForgeError, Result};
use crate::events::{Event, EventAction, EventLog};
use crate::fs::atomic_write;
use crate::render::TemplateSet;
use globset::Glob;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Filename of the global artifact.
const GLOBAL_FILE: &str = "bird.conf";

/// Naming convention for generated per-peer files.
const PEER_FILE_GLOB: &str = "AS*.conf";

/// A fully rendered artifact, ready to write.
struct Artifact {
    filename: String,
    content: String,
}

/// Reconcile the output directory against the current peer set.
pub fn reconcile(
    config: &GlobalConfig,
    templates: &TemplateSet,
    dry_run: bool,
    events: &EventLog,
) -> Result<()> {
    // Render everything first; nothing on disk changes if any render fails.
    let global = Artifact {
        filename: GLOBAL_FILE.to_string(),
        content: templates.render_global(config)?,
    };

    let mut peer_files = Vec::new();
    for (name, peer) in &config.peers {
        peer_files.push(Artifact {
            filename: peer_file_name(peer.asn, &peer.protocol_name),
            content: templates.render_peer(name, peer)?,
        });
    }

    if dry_run {
        info!(
            "dry run: would write {} and {} peer file(s), skipping all filesystem changes",
            GLOBAL_FILE,
            peer_files.len()
        );
        return Ok(());
    }

    atomic_write(config.bird_directory.join(&global.filename), global.content.as_bytes())?;
    debug!("wrote global config {}", GLOBAL_FILE);

    let removed = remove_stale_peer_files(config)?;

    for artifact in &peer_files {
        atomic_write(
            config.bird_directory.join(&artifact.filename),
            artifact.content.as_bytes(),
        )?;
        debug!("wrote peer config {}", artifact.filename);
    }

    info!(
        "reconciled {}: {} peer file(s) written, {} stale file(s) removed",
        config.bird_directory.display(),
        peer_files.len(),
        removed
    );
    events.append(&Event::new(EventAction::TreeReconciled).with_details(json!({
        "directory": config.bird_directory.display().to_string(),
        "written": peer_files.len(),
        "removed": removed,
    })))?;

    Ok(())
}

/// Generated per-peer filename: ASN plus sanitized name.
pub fn peer_file_name(asn: u32, protocol_name: &str) -> String {
    format!("AS{}_{}.conf", asn, protocol_name)
}

/// Delete every file matching the generated-file naming convention.
/// Files outside the convention (including `bird.conf` and dotfiles) are
/// never touched.
fn remove_stale_peer_files(config: &GlobalConfig) -> Result<usize> {
    let matcher = Glob::new(PEER_FILE_GLOB)
        .map_err(|e| ForgeError::Write(format!("internal glob error: {}", e)))?
        .compile_matcher();

    let entries = fs::read_dir(&config.bird_directory).map_err(|e| {
        ForgeError::Write(format!(
            "failed to list output directory '{}': {}",
            config.bird_directory.display(),
            e
        ))
    })?;

    let mut removed = 0;
    for entry in entries {
        let entry =
            entry.map_err(|e| ForgeError::Write(format!("failed to read directory entry: {}", e)))?;
        let path: PathBuf = entry.path();

        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !matcher.is_match(filename) {
            continue;
        }

        fs::remove_file(&path).map_err(|e| {
            ForgeError::Write(format!(
                "failed to remove stale config '{}': {}",
                path.display(),
                e
            ))
        })?;
        debug!("removed stale peer config {}", filename);
        removed += 1;
    }

    Ok(removed)
}
