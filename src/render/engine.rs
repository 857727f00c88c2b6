//! Placeholder substitution engine.
//!
//! Templates use `{variable}` placeholders. `{{` renders a literal `{`
//! (BIRD and keepalived configs open blocks with braces); a lone `}` is
//! passed through unchanged, so only opening braces need escaping.
//!
//! The engine is fail-loud: an undefined variable is an error, never an
//! empty substitution. A silently empty prefix filter in a rendered config
//! would be a security exposure, not a cosmetic bug.

use std::collections::HashMap;
use thiserror::Error;

/// Substitution failure inside a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder referenced a variable that was not provided.
    #[error("undefined variable '{name}' at offset {position}")]
    UndefinedVariable { name: String, position: usize },

    /// A `{` placeholder was never closed.
    #[error("unclosed placeholder at offset {position}")]
    UnclosedPlaceholder { position: usize },

    /// An empty `{}` placeholder.
    #[error("empty placeholder at offset {position}")]
    EmptyPlaceholder { position: usize },
}

/// Substitute `{variable}` placeholders in `template` from `vars`.
pub fn substitute(
    template: &str,
    vars: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '{' {
            out.push(ch);
            continue;
        }

        // `{{` escapes a literal opening brace.
        if matches!(chars.peek(), Some((_, '{'))) {
            chars.next();
            out.push('{');
            continue;
        }

        let mut name = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            name.push(c);
        }

        if !closed {
            return Err(TemplateError::UnclosedPlaceholder { position: pos });
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyPlaceholder { position: pos });
        }

        match vars.get(name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(TemplateError::UndefinedVariable {
                    name: name.to_string(),
                    position: pos,
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_variables() {
        let result = substitute(
            "router id {router_id};",
            &vars(&[("router_id", "192.0.2.1")]),
        )
        .unwrap();
        assert_eq!(result, "router id 192.0.2.1;");
    }

    #[test]
    fn plain_text_passes_through() {
        let result = substitute("scan time 10;", &HashMap::new()).unwrap();
        assert_eq!(result, "scan time 10;");
    }

    #[test]
    fn escaped_brace_renders_literal() {
        let result = substitute("protocol device {{\n}", &HashMap::new()).unwrap();
        assert_eq!(result, "protocol device {\n}");
    }

    #[test]
    fn lone_closing_brace_is_literal() {
        let result = substitute("}", &HashMap::new()).unwrap();
        assert_eq!(result, "}");
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let err = substitute("{missing}", &HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedVariable {
                name: "missing".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn unclosed_placeholder_is_an_error() {
        let err = substitute("neighbor {addr", &HashMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::UnclosedPlaceholder { position: 9 });
    }

    #[test]
    fn empty_placeholder_is_an_error() {
        let err = substitute("x {} y", &HashMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::EmptyPlaceholder { position: 2 });
    }

    #[test]
    fn placeholder_names_are_trimmed() {
        let result = substitute("{ asn }", &vars(&[("asn", "64496")])).unwrap();
        assert_eq!(result, "64496");
    }
}
