//! Method identifiers and the names derived from them during installation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that may close a method name (predicate, mutation, setter).
pub const MARKERS: [char; 3] = ['?', '!', '='];

fn is_marker(c: char) -> bool {
    MARKERS.contains(&c)
}

const ORIGINAL_SUFFIX: &str = "_without_benchmark";
const TRANSIENT_SUFFIX: &str = "_with_benchmark";

/// A stable method identifier, including any trailing marker character.
///
/// The identifier a caller sees in notifications is always the facing name,
/// never one of the derived names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodName(String);

impl MethodName {
    /// Parse a method identifier.
    ///
    /// Rejects empty names, whitespace, a bare marker, and marker characters
    /// anywhere but the last position.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let base = name.strip_suffix(is_marker).unwrap_or(&name);

        let valid = !base.is_empty()
            && !base
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || is_marker(c));

        if valid {
            Ok(Self(name))
        } else {
            Err(Error::InvalidMethodName(name))
        }
    }

    /// The full identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without its trailing marker.
    pub fn base(&self) -> &str {
        self.0.strip_suffix(is_marker).unwrap_or(&self.0)
    }

    /// The trailing marker, if any.
    pub fn marker(&self) -> Option<char> {
        self.0.chars().last().filter(|&c| is_marker(c))
    }

    /// Name under which the pre-installation implementation is kept.
    pub fn original_name(&self) -> MethodName {
        self.derive(ORIGINAL_SUFFIX)
    }

    /// Name of the instrumented body before it takes over the facing name.
    pub fn transient_name(&self) -> MethodName {
        self.derive(TRANSIENT_SUFFIX)
    }

    // The marker moves to the end so the derived name stays a valid identifier.
    fn derive(&self, suffix: &str) -> MethodName {
        let mut derived = String::with_capacity(self.0.len() + suffix.len());
        derived.push_str(self.base());
        derived.push_str(suffix);
        if let Some(marker) = self.marker() {
            derived.push(marker);
        }
        MethodName(derived)
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MethodName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MethodName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MethodName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MethodName> for String {
    fn from(name: MethodName) -> Self {
        name.0
    }
}

impl PartialEq<str> for MethodName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MethodName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_name_derivation() {
        let name = MethodName::new("public_benchmarked").unwrap();
        assert_eq!(name.marker(), None);
        assert_eq!(name.original_name(), "public_benchmarked_without_benchmark");
        assert_eq!(name.transient_name(), "public_benchmarked_with_benchmark");
    }

    #[test]
    fn test_marker_relocated_to_end() {
        let predicate = MethodName::new("valid?").unwrap();
        assert_eq!(predicate.base(), "valid");
        assert_eq!(predicate.marker(), Some('?'));
        assert_eq!(predicate.original_name(), "valid_without_benchmark?");
        assert_eq!(predicate.transient_name(), "valid_with_benchmark?");

        let bang = MethodName::new("save!").unwrap();
        assert_eq!(bang.original_name(), "save_without_benchmark!");

        let setter = MethodName::new("name=").unwrap();
        assert_eq!(setter.transient_name(), "name_with_benchmark=");
    }

    #[test]
    fn test_invalid_names() {
        assert!(MethodName::new("").is_err());
        assert!(MethodName::new("?").is_err());
        assert!(MethodName::new("two words").is_err());
        assert!(MethodName::new("va?lid").is_err());
        assert!(MethodName::new("save!!").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let name = MethodName::new("empty?").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"empty?\"");

        let parsed: MethodName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
        assert!(serde_json::from_str::<MethodName>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn derived_names_keep_base_and_marker(
            base in "[a-z_][a-z0-9_]{0,16}",
            marker in proptest::option::of(proptest::sample::select(MARKERS.to_vec())),
        ) {
            let mut raw = base.clone();
            if let Some(m) = marker {
                raw.push(m);
            }
            let name = MethodName::new(raw).unwrap();

            for derived in [name.original_name(), name.transient_name()] {
                prop_assert!(derived.as_str().starts_with(&base));
                prop_assert_eq!(derived.marker(), marker);
                prop_assert!(MethodName::new(derived.as_str()).is_ok());
            }
            prop_assert_ne!(name.original_name(), name.transient_name());
        }
    }
}
