//! Exit code constants for the birdforge CLI.
//!
//! - 0: Success
//! - 1: Configuration error (bad input, missing AS-SET on a filtered session)
//! - 2: Template render failure
//! - 3: Output file write failure
//! - 4: BIRD control-channel failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Configuration error: malformed declaration, validation failure, or a
/// filtered session type left without a resolvable AS-SET.
pub const CONFIG_ERROR: i32 = 1;

/// Template render failure: missing variable or template syntax error.
pub const RENDER_FAILURE: i32 = 2;

/// Write failure: could not create or replace a file in the output directory.
pub const WRITE_FAILURE: i32 = 3;

/// BIRD failure: the daemon refused the reload or the socket was unreachable.
pub const BIRD_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            CONFIG_ERROR,
            RENDER_FAILURE,
            WRITE_FAILURE,
            BIRD_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
