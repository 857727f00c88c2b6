//! Protocol-name sanitization for peer identifiers.
//!
//! BIRD protocol names must match `[A-Za-z_][A-Za-z0-9_]*`. Peer names in the
//! input declaration are free-form ("Cloudflare", "AS112 Project", "64496:ix"),
//! so every name is passed through [`normalize`] before it is used in a
//! protocol definition or an output filename.
//!
//! Distinct inputs may normalize to the same token ("a b" and "a-b" both
//! become `a_b`). That is a documented limitation, not a defect; peer names
//! are unique keys in the input, and collisions only matter if two declared
//! names differ solely in punctuation.

/// Literal prefix applied when a peer name starts with a digit.
pub const DIGIT_PREFIX: &str = "PEER_";

/// Normalize a free-form peer name into a valid BIRD protocol-name token.
///
/// If the first character is a digit, the literal `PEER_` prefix is
/// prepended before sanitizing. Every character outside `[A-Za-z0-9_]` is
/// replaced with `_`.
///
/// The function is deterministic and idempotent:
/// `normalize(normalize(x)) == normalize(x)` for all inputs.
pub fn normalize(name: &str) -> String {
    let prefixed = match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("{}{}", DIGIT_PREFIX, name),
        _ => name.to_string(),
    };

    prefixed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_valid_names_through() {
        assert_eq!(normalize("cloudflare"), "cloudflare");
        assert_eq!(normalize("Hurricane_Electric"), "Hurricane_Electric");
    }

    #[test]
    fn replaces_invalid_characters() {
        assert_eq!(normalize("he.net"), "he_net");
        assert_eq!(normalize("AS112 Project"), "AS112_Project");
        assert_eq!(normalize("peer-a:b"), "peer_a_b");
    }

    #[test]
    fn prefixes_digit_leading_names() {
        assert_eq!(normalize("100foo"), "PEER_100foo");
        assert_eq!(normalize("64496"), "PEER_64496");
    }

    #[test]
    fn no_prefix_for_letter_leading_names() {
        assert_eq!(normalize("foo100"), "foo100");
    }

    #[test]
    fn is_idempotent() {
        for name in ["100foo", "he.net", "AS112 Project", "", "a", "_x", "9"] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "normalize must be idempotent for {:?}", name);
        }
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(normalize("64496:ix"), normalize("64496:ix"));
    }

    #[test]
    fn empty_name_stays_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn output_is_valid_protocol_token() {
        for name in ["100foo", "he.net", "AS112 Project", "ümlaut", "9-1-1"] {
            let token = normalize(name);
            let mut chars = token.chars();
            let first = chars.next().unwrap();
            assert!(first.is_ascii_alphabetic() || first == '_');
            assert!(chars.all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }

    #[test]
    fn distinct_inputs_may_collide() {
        // Known limitation: punctuation-only differences collapse.
        assert_eq!(normalize("a b"), normalize("a-b"));
    }
}
