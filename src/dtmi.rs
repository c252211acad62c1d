//! DTMI parsing and path conventions
//!
//! A digital twin model identifier (DTMI) names a model and its version,
//! e.g. `dtmi:com:example:Thermostat;1`. Repository lookups are derived
//! from the identifier by a deterministic path convention.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::ResolverError;

/// Validation regex from the digital-twin-model-identifier specification.
///
/// Scheme `dtmi:`, one or more colon-separated segments (each starts with a
/// letter, contains letters/digits/underscore, never ends in underscore),
/// then `;` and a version with no leading zero, at most nine digits.
static DTMI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^dtmi:[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?(?::[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?)*;[1-9][0-9]{0,8}$",
    )
    .unwrap()
});

/// Suffix of a plain model document.
pub const JSON_SUFFIX: &str = ".json";

/// Suffix of a pre-computed expanded bundle.
pub const EXPANDED_JSON_SUFFIX: &str = ".expanded.json";

/// A validated DTMI.
///
/// Construction fails unless the string matches the identifier grammar.
/// Equality and hashing are case-sensitive on the form as given; path
/// mapping lower-cases separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Dtmi(String);

impl Dtmi {
    /// Validate `s` against the DTMI grammar.
    pub fn parse(s: &str) -> Result<Self, ResolverError> {
        if DTMI_REGEX.is_match(s) {
            Ok(Dtmi(s.to_string()))
        } else {
            Err(ResolverError::InvalidDtmiFormat(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without its version suffix, e.g.
    /// `dtmi:com:example:Thermostat` for `dtmi:com:example:Thermostat;1`.
    pub fn namespace(&self) -> &str {
        // The grammar guarantees exactly one ';'.
        &self.0[..self.0.rfind(';').unwrap_or(self.0.len())]
    }

    /// The version component.
    pub fn version(&self) -> u32 {
        self.0
            .rsplit(';')
            .next()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

impl fmt::Display for Dtmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Dtmi {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dtmi::parse(s)
    }
}

impl AsRef<str> for Dtmi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Map a DTMI to its relative repository path.
///
/// Lower-cases the identifier, replaces `:` with `/` and `;` with `-`, and
/// appends `.json` (or `.expanded.json` for pre-computed bundles).
/// `dtmi:com:example:Thermostat;1` -> `dtmi/com/example/thermostat-1.json`.
pub fn dtmi_to_path(dtmi: &Dtmi, expanded: bool) -> String {
    let base = dtmi.as_str().to_lowercase().replace(':', "/").replace(';', "-");
    let suffix = if expanded { EXPANDED_JSON_SUFFIX } else { JSON_SUFFIX };
    format!("{}{}", base, suffix)
}
