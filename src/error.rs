//! Error types for birdforge.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for birdforge operations.
///
/// Each variant maps to a specific exit code. The propagation policy favors
/// failing the whole run over generating an unsafe or half-reconciled
/// configuration: an unfiltered peering session or a partially rewritten
/// output directory is worse than stopping.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Malformed or invalid input declaration, including a filtered session
    /// type left without a resolvable AS-SET.
    #[error("{0}")]
    Config(String),

    /// Template rendering failed (undefined variable or syntax error).
    #[error("template render failed: {0}")]
    Render(String),

    /// An output file or directory could not be created or replaced.
    #[error("write failed: {0}")]
    Write(String),

    /// The BIRD control channel refused the reload or was unreachable.
    #[error("BIRD reconfigure failed: {0}")]
    Bird(String),
}

impl ForgeError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ForgeError::Config(_) => exit_codes::CONFIG_ERROR,
            ForgeError::Render(_) => exit_codes::RENDER_FAILURE,
            ForgeError::Write(_) => exit_codes::WRITE_FAILURE,
            ForgeError::Bird(_) => exit_codes::BIRD_FAILURE,
        }
    }
}

/// Result type alias for birdforge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;
