//! Tag predicates: voltage-class equivalence, reference/name matching and
//! parsing of free-text power values.
//!
//! Mapping data encodes lists inside single tag values (`voltage=110000;220000`,
//! `ref=303;304`). Two features are considered compatible when their token lists
//! intersect. Unset values act as wildcards for voltage but not for references: a
//! line without `ref` only continues another line without `ref`.
//!
//! Contributors disagree on the list separator for `ref`/`name`. Some use `;`
//! (the documented convention), others use `,`. [`TokenPolicy`] makes that choice
//! explicit instead of hard-coding one of them.

use crate::units::Watts;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How `ref` and `name` values are split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPolicy {
    /// Only `;` separates tokens.
    #[default]
    Semicolon,
    /// Both `;` and `,` separate tokens.
    SemicolonOrComma,
}

impl TokenPolicy {
    #[inline]
    fn is_separator(self, c: char) -> bool {
        match self {
            TokenPolicy::Semicolon => c == ';',
            TokenPolicy::SemicolonOrComma => c == ';' || c == ',',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenPolicy::Semicolon => "semicolon",
            TokenPolicy::SemicolonOrComma => "semicolon-or-comma",
        }
    }
}

impl FromStr for TokenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semicolon" | ";" => Ok(TokenPolicy::Semicolon),
            "semicolon-or-comma" | "auto" | ";," => Ok(TokenPolicy::SemicolonOrComma),
            other => Err(format!(
                "unknown token policy '{other}' (expected 'semicolon' or 'semicolon-or-comma')"
            )),
        }
    }
}

impl std::fmt::Display for TokenPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a tag value into trimmed tokens. Empty tokens are kept so that a value
/// always yields at least one token.
pub fn tokens(value: &str, policy: TokenPolicy) -> impl Iterator<Item = &str> {
    value.split(move |c| policy.is_separator(c)).map(str::trim)
}

/// Two voltage strings are common if either is unset or their `;`-separated
/// token sets intersect. Tokens are compared as exact strings.
pub fn have_common_voltage(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => intersects(a, b, TokenPolicy::Semicolon),
        _ => true,
    }
}

/// Compare two reference (or name) values.
///
/// Both unset match, exactly one unset does not, otherwise the token sets must
/// intersect.
pub fn ref_matches(a: Option<&str>, b: Option<&str>, policy: TokenPolicy) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => intersects(a, b, policy),
        _ => false,
    }
}

/// Whether a line identified by `line_ref`/`line_name` continues a trace that
/// follows `trace_ref`/`trace_name`. Identifiers may sit in either field, so all
/// four pairings are tried.
pub fn continuation_matches(
    trace_ref: Option<&str>,
    trace_name: Option<&str>,
    line_ref: Option<&str>,
    line_name: Option<&str>,
    policy: TokenPolicy,
) -> bool {
    ref_matches(trace_ref, line_ref, policy)
        || ref_matches(trace_name, line_name, policy)
        || ref_matches(trace_name, line_ref, policy)
        || ref_matches(trace_ref, line_name, policy)
}

fn intersects(a: &str, b: &str, policy: TokenPolicy) -> bool {
    tokens(a, policy).any(|left| tokens(b, policy).any(|right| left == right))
}

/// Parse a free-text power value such as `"850 MW"`, `"1,5 GW"` or `"400kW"`.
///
/// The number before the first magnitude letter is scaled by `k/K` = 1e3,
/// `m/M` = 1e6, `g/G` = 1e9 (checked in that order). A bare number is taken as
/// watts. Anything unparsable, and an absent value, yields zero.
pub fn parse_power(value: Option<&str>) -> Watts {
    let Some(raw) = value else {
        return Watts(0.0);
    };
    let normalized = raw.replace(',', ".");

    const SUFFIXES: [(char, f64); 6] = [
        ('k', 1.0e3),
        ('K', 1.0e3),
        ('m', 1.0e6),
        ('M', 1.0e6),
        ('g', 1.0e9),
        ('G', 1.0e9),
    ];

    let (number, factor) = SUFFIXES
        .iter()
        .find_map(|(suffix, factor)| {
            normalized
                .split_once(*suffix)
                .map(|(head, _)| (head, *factor))
        })
        .unwrap_or((normalized.as_str(), 1.0));

    number
        .trim()
        .parse::<f64>()
        .map(|n| Watts(n * factor))
        .unwrap_or(Watts(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_common_voltage_wildcard() {
        assert!(have_common_voltage(None, Some("220000")));
        assert!(have_common_voltage(Some("110000"), None));
        assert!(have_common_voltage(None, None));
    }

    #[test]
    fn test_common_voltage_reflexive_and_symmetric() {
        let samples = ["110000", "110000;220000", " 380000 ", "220000;380000", ""];
        for a in samples {
            assert!(have_common_voltage(Some(a), Some(a)), "reflexive for {a:?}");
            for b in samples {
                assert_eq!(
                    have_common_voltage(Some(a), Some(b)),
                    have_common_voltage(Some(b), Some(a)),
                    "symmetric for {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_common_voltage_token_intersection() {
        assert!(have_common_voltage(Some("220000"), Some("220000;380000")));
        assert!(have_common_voltage(Some("110000; 220000"), Some("220000 ")));
        assert!(!have_common_voltage(Some("110000"), Some("220000;380000")));
        // no numeric tolerance
        assert!(!have_common_voltage(Some("110000"), Some("110 kV")));
    }

    #[test]
    fn test_ref_matches_unset_rules() {
        let p = TokenPolicy::Semicolon;
        assert!(ref_matches(None, None, p));
        assert!(!ref_matches(None, Some("123"), p));
        assert!(!ref_matches(Some("123"), None, p));
    }

    #[test]
    fn test_ref_matches_tokens() {
        let p = TokenPolicy::Semicolon;
        assert!(ref_matches(Some("303;304"), Some("304"), p));
        assert!(ref_matches(Some(" 12 "), Some("12"), p));
        assert!(!ref_matches(Some("303;304"), Some("305"), p));
    }

    #[test]
    fn test_token_policy_controls_comma_splitting() {
        assert!(!ref_matches(
            Some("303,304"),
            Some("304"),
            TokenPolicy::Semicolon
        ));
        assert!(ref_matches(
            Some("303,304"),
            Some("304"),
            TokenPolicy::SemicolonOrComma
        ));
        let parts: Vec<_> = tokens("a, b;c", TokenPolicy::SemicolonOrComma).collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_token_policy_from_str() {
        assert_eq!(
            "semicolon".parse::<TokenPolicy>(),
            Ok(TokenPolicy::Semicolon)
        );
        assert_eq!(
            "Semicolon-Or-Comma".parse::<TokenPolicy>(),
            Ok(TokenPolicy::SemicolonOrComma)
        );
        assert!("pipe".parse::<TokenPolicy>().is_err());
    }

    #[test]
    fn test_continuation_matches_cross_fields() {
        let p = TokenPolicy::Semicolon;
        // ref of the trace written into the name of the next line
        assert!(continuation_matches(
            Some("12"),
            Some("Nord"),
            None,
            Some("12"),
            p
        ));
        // name of the trace written into the ref of the next line
        assert!(continuation_matches(
            Some("12"),
            Some("Nord"),
            Some("Nord"),
            Some("X"),
            p
        ));
        assert!(!continuation_matches(
            Some("12"),
            Some("Nord"),
            Some("13"),
            Some("Sued"),
            p
        ));
    }

    #[test]
    fn test_parse_power_suffixes() {
        assert_relative_eq!(parse_power(Some("850 MW")).value(), 850.0e6);
        assert_relative_eq!(parse_power(Some("400kW")).value(), 400.0e3);
        assert_relative_eq!(parse_power(Some("1,5 GW")).value(), 1.5e9);
        assert_relative_eq!(parse_power(Some("2.2 mW")).value(), 2.2e6);
        assert_relative_eq!(parse_power(Some("1200")).value(), 1200.0);
    }

    #[test]
    fn test_parse_power_defaults_to_zero() {
        assert!(parse_power(None).is_zero());
        assert!(parse_power(Some("yes")).is_zero());
        assert!(parse_power(Some("about 5 MW")).is_zero());
    }
}
