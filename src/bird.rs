//! BIRD control channel and auxiliary artifacts.
//!
//! After a successful reconciliation pass the daemon is told to reload via
//! its UNIX control socket. The socket protocol is line-oriented: the daemon
//! greets with `0001 ...`, the client sends a command, and the reply is a
//! sequence of `NNNN-` continuation lines closed by a `NNNN ` final line.
//! Codes starting with 8 or 9 are runtime and syntax errors; anything else
//! is success (`0003 Reconfigured`, `0004 Reconfiguration in progress`).
//!
//! A failed reload is fatal for the run: the files on disk no longer match
//! what the daemon is running, and silently leaving that divergence in
//! place is worse than a nonzero exit.
//!
//! This module also writes the optional redundancy (keepalived/VRRP) and
//! operator-summary artifacts, both rendered through the template set and
//! written atomically.

use crate::config::GlobalConfig;
use crate::error::{ForgeError, Result};
use crate::fs::atomic_write;
use crate::render::TemplateSet;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Send `configure` to the daemon and verify it accepted the new config.
/// Returns the daemon's reply text.
pub fn configure(socket_path: &Path, timeout: Duration) -> Result<String> {
    let stream = UnixStream::connect(socket_path).map_err(|e| {
        ForgeError::Bird(format!(
            "cannot connect to control socket '{}': {}",
            socket_path.display(),
            e
        ))
    })?;

    stream
        .set_read_timeout(Some(timeout))
        .and_then(|_| stream.set_write_timeout(Some(timeout)))
        .map_err(|e| ForgeError::Bird(format!("control socket setup failed: {}", e)))?;

    let mut writer = stream
        .try_clone()
        .map_err(|e| ForgeError::Bird(format!("control socket split failed: {}", e)))?;
    let mut reader = BufReader::new(stream);

    let reply = exchange(&mut writer, &mut reader, "configure")?;
    info!("BIRD accepted reconfiguration: {}", reply.lines().last().unwrap_or(""));
    Ok(reply)
}

/// Run one command over an established control connection: consume the
/// greeting, send the command, collect the reply up to its final line.
fn exchange<W: Write, R: BufRead>(writer: &mut W, reader: &mut R, command: &str) -> Result<String> {
    let greeting = read_line(reader)?;
    if !greeting.starts_with("0001") {
        return Err(ForgeError::Bird(format!(
            "unexpected greeting from daemon: '{}'",
            greeting
        )));
    }
    debug!("connected: {}", greeting);

    writer
        .write_all(format!("{}\n", command).as_bytes())
        .map_err(|e| ForgeError::Bird(format!("failed to send '{}': {}", command, e)))?;

    let mut reply = String::new();
    loop {
        let line = read_line(reader)?;
        reply.push_str(&line);
        reply.push('\n');

        // Continuation lines are `NNNN-text` or indented bare text; the
        // final line is `NNNN text`.
        let bytes = line.as_bytes();
        if bytes.len() >= 5
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[4] == b' '
        {
            let code = &line[..4];
            if code.starts_with('8') || code.starts_with('9') {
                return Err(ForgeError::Bird(format!(
                    "daemon rejected '{}': {}",
                    command,
                    line.trim()
                )));
            }
            return Ok(reply);
        }
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .map_err(|e| ForgeError::Bird(format!("control socket read failed: {}", e)))?;
    if n == 0 {
        return Err(ForgeError::Bird(
            "daemon closed the control connection".to_string(),
        ));
    }
    Ok(line.trim_end().to_string())
}

/// Write the keepalived artifact when a `vrrp` section is configured.
pub fn write_vrrp_config(config: &GlobalConfig, templates: &TemplateSet) -> Result<()> {
    let Some(vrrp) = &config.vrrp else {
        debug!("no vrrp section configured, skipping keepalived config");
        return Ok(());
    };

    let rendered = templates.render_vrrp(vrrp)?;
    atomic_write(&vrrp.config_path, rendered.as_bytes())?;
    info!("wrote keepalived config to {}", vrrp.config_path.display());
    Ok(())
}

/// Write the operator summary when `ui_file` is configured.
pub fn write_ui_file(config: &GlobalConfig, templates: &TemplateSet) -> Result<()> {
    let Some(path) = &config.ui_file else {
        debug!("ui_file is not configured, skipping summary");
        return Ok(());
    };

    let generated_at = chrono::Utc::now().to_rfc3339();
    let rendered = templates.render_ui(config, &config.peers, &generated_at)?;
    atomic_write(path, rendered.as_bytes())?;
    info!("wrote peer summary to {}", path.display());
    Ok(())
}
