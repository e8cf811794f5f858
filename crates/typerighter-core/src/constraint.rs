//! Reusable validation constraints
//!
//! Constraints are parameterized rules that install named validators on a
//! type instance: [`LengthConstraint`] for sized values, [`RangeConstraint`]
//! for numbers, and [`PatternConstraint`] for strings. Falsy values skip
//! every rule, and a zero minimum is no bound at all.

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

use crate::declaration::Settings;
use crate::definition::Validator;
use crate::error::{Error, Result};
use crate::types::Type;
use crate::value::Value;

/// A rule that contributes validators to a type instance
pub trait Constraint: std::fmt::Debug {
    /// Install this constraint's validators, replacing same-named entries
    fn attach(&self, validators: &mut IndexMap<String, Validator>);
}

/// Inclusive bounds on the length of a sized value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthConstraint {
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthConstraint {
    /// Create length bounds
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `min` exceeds `max`
    pub fn new(min: Option<usize>, max: Option<usize>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::config(format!("min_length {lo} exceeds max_length {hi}")));
            }
        }
        Ok(Self { min, max })
    }

    /// Read `min_length` and `max_length` options
    ///
    /// # Errors
    /// Returns [`Error::Config`] for malformed bounds
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.count("min_length")?, settings.count("max_length")?)
    }

    fn check_min(min: usize, ty: &dyn Type, value: &Value) -> Result<()> {
        if min == 0 || ty.is_falsy(value) {
            return Ok(());
        }
        match value.len() {
            Some(len) if len < min => Err(Error::validation(format!(
                "Value below min length: {value} < {min}"
            ))),
            Some(_) => Ok(()),
            None => Err(Error::validation(format!("Value has no length: {value}"))),
        }
    }

    fn check_max(max: usize, ty: &dyn Type, value: &Value) -> Result<()> {
        if ty.is_falsy(value) {
            return Ok(());
        }
        match value.len() {
            Some(len) if len > max => Err(Error::validation(format!(
                "Value length above max: {len} > {max}"
            ))),
            Some(_) => Ok(()),
            None => Err(Error::validation(format!("Value has no length: {value}"))),
        }
    }
}

impl Constraint for LengthConstraint {
    fn attach(&self, validators: &mut IndexMap<String, Validator>) {
        if let Some(min) = self.min {
            validators.insert(
                "min_length".to_string(),
                Arc::new(move |ty: &dyn Type, value: &Value| Self::check_min(min, ty, value)),
            );
        }
        if let Some(max) = self.max {
            validators.insert(
                "max_length".to_string(),
                Arc::new(move |ty: &dyn Type, value: &Value| Self::check_max(max, ty, value)),
            );
        }
    }
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeConstraint {
    min: Option<f64>,
    max: Option<f64>,
}

impl RangeConstraint {
    /// Create numeric bounds
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `min` exceeds `max` or a bound is NaN
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
            return Err(Error::config("numeric bound is NaN"));
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::config(format!("min {lo} exceeds max {hi}")));
            }
        }
        Ok(Self { min, max })
    }

    /// Read `min` and `max` options
    ///
    /// # Errors
    /// Returns [`Error::Config`] for malformed bounds
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.number("min")?, settings.number("max")?)
    }

    fn numeric(value: &Value) -> Result<f64> {
        value
            .as_f64()
            .ok_or_else(|| Error::validation(format!("Value is not numeric: {value}")))
    }

    fn check_min(min: f64, ty: &dyn Type, value: &Value) -> Result<()> {
        if min.abs() < f64::EPSILON || ty.is_falsy(value) {
            return Ok(());
        }
        if Self::numeric(value)? < min {
            return Err(Error::validation(format!("Value below allowed min: {value} < {min}")));
        }
        Ok(())
    }

    fn check_max(max: f64, ty: &dyn Type, value: &Value) -> Result<()> {
        if ty.is_falsy(value) {
            return Ok(());
        }
        if Self::numeric(value)? > max {
            return Err(Error::validation(format!("Value exceeds allowed max: {value} > {max}")));
        }
        Ok(())
    }
}

impl Constraint for RangeConstraint {
    fn attach(&self, validators: &mut IndexMap<String, Validator>) {
        if let Some(min) = self.min {
            validators.insert(
                "min".to_string(),
                Arc::new(move |ty: &dyn Type, value: &Value| Self::check_min(min, ty, value)),
            );
        }
        if let Some(max) = self.max {
            validators.insert(
                "max".to_string(),
                Arc::new(move |ty: &dyn Type, value: &Value| Self::check_max(max, ty, value)),
            );
        }
    }
}

/// Regular expression a string must match from its start
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    source: String,
    regex: Regex,
}

impl PatternConstraint {
    /// Compile a case-sensitive pattern
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the pattern does not compile
    pub fn new(pattern: &str) -> Result<Self> {
        Self::compile(pattern, false)
    }

    /// Compile a case-insensitive pattern
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the pattern does not compile
    pub fn case_insensitive(pattern: &str) -> Result<Self> {
        Self::compile(pattern, true)
    }

    /// Read the `regex` option, `None` when unset
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a non-string or invalid pattern
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        settings.text("regex")?.as_deref().map(Self::new).transpose()
    }

    fn compile(pattern: &str, case_insensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(&format!("^(?:{pattern})"))
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| Error::config(format!("Regex failed to compile: {pattern}: {e}")))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Original pattern text
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check a string against the pattern
    #[inline]
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl Constraint for PatternConstraint {
    fn attach(&self, validators: &mut IndexMap<String, Validator>) {
        let pattern = self.clone();
        validators.insert(
            "regex".to_string(),
            Arc::new(move |ty: &dyn Type, value: &Value| {
                if ty.is_falsy(value) {
                    return Ok(());
                }
                match value.as_str() {
                    Some(text) if !pattern.is_match(text) => Err(Error::validation(format!(
                        "Value did not match regex: {}",
                        pattern.source
                    ))),
                    _ => Ok(()),
                }
            }),
        );
    }
}
