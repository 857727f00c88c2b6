//! IRRd AS-SET expansion over the plain-TCP query protocol.
//!
//! The exchange is line-oriented: the client sends `!!` once to keep the
//! connection open, then one command per query. Replies are framed as:
//!
//! - `A<len>` followed by exactly `len` bytes of payload and a `C` line
//! - `C` alone: success with no payload
//! - `D`: no entries found
//! - `F <message>`: query error
//!
//! Expansion is recursive: `!i<set>,1` resolves the membership graph to
//! origin ASNs, then `!g`/`!6` collect the routes each origin announces,
//! per address family. A bare aut-num (`AS<digits>`) is not a set and has
//! no members to resolve, so it is queried directly as its own single
//! origin. Results are deduplicated and sorted so expansion is
//! deterministic for a given registry snapshot.

use super::{RegistryError, RegistryResult};
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub struct IrrClient {
    server: String,
    timeout: Duration,
}

impl IrrClient {
    pub fn new(server: &str, timeout: Duration) -> Self {
        IrrClient {
            server: server.to_string(),
            timeout,
        }
    }

    /// Expand an AS-SET into `(prefixes4, prefixes6)`.
    pub fn expand(&self, as_set: &str) -> RegistryResult<(Vec<String>, Vec<String>)> {
        let stream = self.connect()?;
        let mut writer = stream
            .try_clone()
            .map_err(|e| RegistryError(format!("IRR connection split failed: {}", e)))?;
        let mut reader = BufReader::new(stream);
        expand_on(&mut writer, &mut reader, as_set)
    }

    fn connect(&self) -> RegistryResult<TcpStream> {
        let addr = self
            .server
            .to_socket_addrs()
            .map_err(|e| RegistryError(format!("cannot resolve IRR server '{}': {}", self.server, e)))?
            .next()
            .ok_or_else(|| {
                RegistryError(format!("IRR server '{}' resolved to no addresses", self.server))
            })?;

        let stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| RegistryError(format!("cannot connect to IRR server '{}': {}", self.server, e)))?;

        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
            .map_err(|e| RegistryError(format!("IRR socket setup failed: {}", e)))?;

        Ok(stream)
    }
}

/// Run the full expansion exchange on an established connection.
fn expand_on<W: Write, R: BufRead>(
    writer: &mut W,
    reader: &mut R,
    as_set: &str,
) -> RegistryResult<(Vec<String>, Vec<String>)> {
    writer
        .write_all(b"!!\n")
        .map_err(|e| RegistryError(format!("IRR handshake failed: {}", e)))?;

    // A bare aut-num answers `!i` with "no entries"; use it as the origin.
    let members = if is_bare_asn(as_set) {
        as_set.to_string()
    } else {
        run_query(writer, reader, &format!("!i{},1", as_set))?
    };

    let mut prefixes4 = BTreeSet::new();
    let mut prefixes6 = BTreeSet::new();
    for origin in members.split_whitespace() {
        let routes4 = run_query(writer, reader, &format!("!g{}", origin))?;
        prefixes4.extend(routes4.split_whitespace().map(String::from));

        let routes6 = run_query(writer, reader, &format!("!6{}", origin))?;
        prefixes6.extend(routes6.split_whitespace().map(String::from));
    }

    Ok((
        prefixes4.into_iter().collect(),
        prefixes6.into_iter().collect(),
    ))
}

/// True for a plain aut-num like `AS64511`, false for any set name.
fn is_bare_asn(name: &str) -> bool {
    name.len() > 2
        && name[..2].eq_ignore_ascii_case("AS")
        && name[2..].bytes().all(|b| b.is_ascii_digit())
}

/// Send one command and read its framed reply. Returns the payload, or an
/// empty string for `C`/`D` replies without one.
fn run_query<W: Write, R: BufRead>(
    writer: &mut W,
    reader: &mut R,
    command: &str,
) -> RegistryResult<String> {
    writer
        .write_all(format!("{}\n", command).as_bytes())
        .map_err(|e| RegistryError(format!("IRR query '{}' failed: {}", command, e)))?;

    let header = read_line(reader, command)?;
    match header.as_bytes().first() {
        Some(b'A') => {
            let len: usize = header[1..].trim().parse().map_err(|_| {
                RegistryError(format!("IRR reply to '{}' has bad length '{}'", command, header))
            })?;

            let mut payload = vec![0u8; len];
            reader.read_exact(&mut payload).map_err(|e| {
                RegistryError(format!("IRR reply to '{}' truncated: {}", command, e))
            })?;

            // Payload is followed by its own terminator line.
            let terminator = read_line(reader, command)?;
            if !terminator.starts_with('C') {
                return Err(RegistryError(format!(
                    "IRR reply to '{}' ended with '{}', expected 'C'",
                    command, terminator
                )));
            }

            String::from_utf8(payload)
                .map(|s| s.trim().to_string())
                .map_err(|_| RegistryError(format!("IRR reply to '{}' is not UTF-8", command)))
        }
        Some(b'C') | Some(b'D') => Ok(String::new()),
        Some(b'F') => Err(RegistryError(format!(
            "IRR query '{}' rejected: {}",
            command,
            header[1..].trim()
        ))),
        _ => Err(RegistryError(format!(
            "IRR reply to '{}' not understood: '{}'",
            command, header
        ))),
    }
}

fn read_line<R: BufRead>(reader: &mut R, command: &str) -> RegistryResult<String> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .map_err(|e| RegistryError(format!("IRR read for '{}' failed: {}", command, e)))?;
    if n == 0 {
        return Err(RegistryError(format!(
            "IRR server closed the connection during '{}'",
            command
        )));
    }
    Ok(line.trim_end().to_string())
}
