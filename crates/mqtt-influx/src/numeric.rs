// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Numeric classification of text payloads.
//!
//! Three policies decide whether a string carries a number:
//!
//! - **strict**: the whole string must be a number (`-12.5e3`)
//! - **tolerant**: the string must *start* with a number (`"12.5 degC"` -> `12.5`)
//! - **eager**: the first number found anywhere wins (`"T=12.5"` -> `12.5`)
//!
//! The policy is resolved once, when the classifier is built.

use crate::error::ParserError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whole-string numeric grammar: sign, digits, fraction, exponent.
const STRICT_PATTERN: &str = r"^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$";

/// Leading numeric prefix, after optional leading whitespace.
const TOLERANT_PATTERN: &str =
    r"^\s*([-+]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?))";

/// Same grammar as strict, unanchored.
const EAGER_PATTERN: &str = r"[-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?";

/// Numeric classification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericMode {
    Strict,
    #[default]
    Tolerant,
    Eager,
}

impl NumericMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericMode::Strict => "strict",
            NumericMode::Tolerant => "tolerant",
            NumericMode::Eager => "eager",
        }
    }
}

impl FromStr for NumericMode {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(NumericMode::Strict),
            "tolerant" => Ok(NumericMode::Tolerant),
            "eager" => Ok(NumericMode::Eager),
            other => Err(ParserError::UnknownNumericMode(other.to_string())),
        }
    }
}

impl fmt::Display for NumericMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum Strategy {
    Strict(Regex),
    Tolerant(Regex),
    Eager(Regex),
}

/// Decides whether a string represents a number.
///
/// Immutable after construction, so one instance can be shared freely
/// between threads.
#[derive(Debug, Clone)]
pub struct NumericClassifier {
    mode: NumericMode,
    strategy: Strategy,
}

impl NumericClassifier {
    /// Build a classifier for the given policy.
    pub fn new(mode: NumericMode) -> Result<Self, ParserError> {
        let strategy = match mode {
            NumericMode::Strict => Strategy::Strict(Regex::new(STRICT_PATTERN)?),
            NumericMode::Tolerant => Strategy::Tolerant(Regex::new(TOLERANT_PATTERN)?),
            NumericMode::Eager => Strategy::Eager(Regex::new(EAGER_PATTERN)?),
        };
        Ok(Self { mode, strategy })
    }

    /// Build a classifier from a policy name (`strict`, `tolerant`, `eager`).
    ///
    /// Any other name is a configuration error.
    pub fn from_name(name: &str) -> Result<Self, ParserError> {
        Self::new(name.parse()?)
    }

    /// The policy this classifier was built with.
    pub fn mode(&self) -> NumericMode {
        self.mode
    }

    /// Classify `value`, returning the parsed number or `None` for "not a number".
    ///
    /// Callers are expected to trim the input first; only the tolerant policy
    /// skips leading whitespace on its own.
    pub fn classify(&self, value: &str) -> Option<f64> {
        let candidate = match &self.strategy {
            Strategy::Strict(re) => re.is_match(value).then_some(value),
            Strategy::Tolerant(re) => re
                .captures(value)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str()),
            Strategy::Eager(re) => re.find(value).map(|m| m.as_str()),
        }?;
        candidate.parse::<f64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(mode: NumericMode) -> NumericClassifier {
        NumericClassifier::new(mode).expect("valid classifier")
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("strict".parse::<NumericMode>().unwrap(), NumericMode::Strict);
        assert_eq!("tolerant".parse::<NumericMode>().unwrap(), NumericMode::Tolerant);
        assert_eq!("eager".parse::<NumericMode>().unwrap(), NumericMode::Eager);
        assert!(matches!(
            "fuzzy".parse::<NumericMode>(),
            Err(ParserError::UnknownNumericMode(m)) if m == "fuzzy"
        ));
    }

    #[test]
    fn test_from_name_rejects_unknown_policy() {
        assert!(NumericClassifier::from_name("Strict").is_err());
        assert!(NumericClassifier::from_name("").is_err());
        let c = NumericClassifier::from_name("eager").expect("eager");
        assert_eq!(c.mode(), NumericMode::Eager);
    }

    #[test]
    fn test_default_mode_is_tolerant() {
        assert_eq!(NumericMode::default(), NumericMode::Tolerant);
    }

    #[test]
    fn test_strict() {
        let c = classifier(NumericMode::Strict);
        assert_eq!(c.classify("123.456"), Some(123.456));
        assert_eq!(c.classify("-123.456"), Some(-123.456));
        assert_eq!(c.classify("+7"), Some(7.0));
        assert_eq!(c.classify(".5"), Some(0.5));
        assert_eq!(c.classify("1.5e3"), Some(1500.0));
        assert_eq!(c.classify("123.456 x"), None);
        assert_eq!(c.classify("lorem ipsum"), None);
        assert_eq!(c.classify(""), None);
        assert_eq!(c.classify("5."), None);
    }

    #[test]
    fn test_tolerant() {
        let c = classifier(NumericMode::Tolerant);
        assert_eq!(c.classify("123.456"), Some(123.456));
        assert_eq!(c.classify("-123.456"), Some(-123.456));
        assert_eq!(c.classify("123.456 x"), Some(123.456));
        assert_eq!(c.classify("42abc"), Some(42.0));
        assert_eq!(c.classify("1e"), Some(1.0));
        assert_eq!(c.classify("5."), Some(5.0));
        assert_eq!(c.classify("  8"), Some(8.0));
        assert_eq!(c.classify("abc"), None);
        assert_eq!(c.classify("x 123"), None);
        assert_eq!(c.classify(""), None);
        assert_eq!(c.classify("-"), None);
    }

    #[test]
    fn test_tolerant_infinity() {
        let c = classifier(NumericMode::Tolerant);
        assert_eq!(c.classify("Infinity"), Some(f64::INFINITY));
        assert_eq!(c.classify("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_eager() {
        let c = classifier(NumericMode::Eager);
        assert_eq!(c.classify("123.456"), Some(123.456));
        assert_eq!(c.classify("123.456 x"), Some(123.456));
        assert_eq!(c.classify("Lorem 123.456 dolorem 42."), Some(123.456));
        assert_eq!(c.classify("temp=-3.5C"), Some(-3.5));
        assert_eq!(c.classify("lorem ipsum"), None);
        assert_eq!(c.classify(""), None);
    }
}
