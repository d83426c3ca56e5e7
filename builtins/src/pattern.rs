//! Compiles an XSD `pattern` facet regular expression (§G Regular Expressions)
//! into a [`regex::Regex`]. XSD patterns match the *entire* lexical value (no
//! implicit anchors in the source syntax, but whole-value matching is the
//! semantics `constraining_facet.rs`'s `Pattern` always wants), so every pattern
//! is wrapped in `^(?:...)$` before compilation.
//!
//! A handful of XSD-specific escapes and classes (`\i`, `\c`, `\I`, `\C`) have no
//! direct Rust `regex` equivalent and are translated to their closest ASCII
//! approximation; multi-character escapes like `\p{IsBasicLatin}` block
//! properties are not translated and will fail to compile, surfacing as a
//! `DatatypeError::InvalidPattern`.

use regex::Regex;

use crate::error::DatatypeError;

fn translate_xsd_escapes(xsd_pattern: &str) -> String {
    let mut out = String::with_capacity(xsd_pattern.len());
    let mut chars = xsd_pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('i') => {
                    out.push_str("[A-Za-z_:]");
                    chars.next();
                }
                Some('I') => {
                    out.push_str("[^A-Za-z_:]");
                    chars.next();
                }
                Some('c') => {
                    out.push_str("[A-Za-z0-9_:.\\-]");
                    chars.next();
                }
                Some('C') => {
                    out.push_str("[^A-Za-z0-9_:.\\-]");
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Compiles a single concatenated `pattern` facet value (already `|`-joined by
/// `ConstrainingFacet::map_from_xml`) into an anchored, whole-value [`Regex`].
pub fn compile(xsd_pattern: &str) -> Result<Regex, DatatypeError> {
    let translated = translate_xsd_escapes(xsd_pattern);
    let anchored = format!("^(?:{translated})$");
    Regex::new(&anchored).map_err(|e| DatatypeError::InvalidPattern(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_value_only() {
        let re = compile("[0-9]+").unwrap();
        assert!(re.is_match("123"));
        assert!(!re.is_match("12a"));
    }

    #[test]
    fn translates_i_and_c_escapes() {
        let re = compile(r"\i\c*").unwrap();
        assert!(re.is_match("a1"));
        assert!(!re.is_match("1a"));
    }

    #[test]
    fn alternation_from_multiple_patterns() {
        let re = compile("foo|bar").unwrap();
        assert!(re.is_match("foo"));
        assert!(re.is_match("bar"));
        assert!(!re.is_match("foobar"));
    }
}
