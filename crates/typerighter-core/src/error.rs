//! Error types for the type engine
//!
//! One error enum covers every failure class the engine produces:
//! - Configuration errors (malformed bounds or patterns, unknown options)
//! - Validation errors (a value breaks a rule)
//! - Conversion errors (a value cannot be coerced at all)
//! - Resolution errors (no sum-type variant accepts a value)
//! - Registry errors (lookup miss, non-subtype registration)

use crate::path::PathError;

/// Main engine error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Type configuration is malformed (raised at construction time)
    #[error("configuration error: {0}")]
    Config(String),

    /// A value failed a validation rule
    #[error("validation failed: {0}")]
    Validation(String),

    /// A value could not be converted to the requested representation
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// No variant of a sum type accepts the value
    #[error("no matching variant for value: {0}")]
    NoVariant(String),

    /// Registry lookup by name failed
    #[error("cache miss for type: {0}")]
    CacheMiss(String),

    /// Registry refused a definition that does not descend from the base type
    #[error("type not cachable: {0}")]
    Uncachable(String),

    /// View access to a field the record does not declare
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Scalar access to a field that is bound as a nested view
    #[error("field '{0}' is a nested record; use the nested view")]
    NestedField(String),

    /// Malformed dotted field path
    #[error("field path error: {0}")]
    Path(#[from] PathError),
}

impl Error {
    /// Create configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create validation error
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create conversion error
    #[inline]
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }

    /// Check if error is a validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if error is a conversion failure
    #[inline]
    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }

    /// Check if error is a sum-type resolution failure
    #[inline]
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::NoVariant(_))
    }

    /// Check if error is a configuration failure
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if error comes from the type registry
    #[inline]
    #[must_use]
    pub fn is_registry(&self) -> bool {
        matches!(self, Self::CacheMiss(_) | Self::Uncachable(_))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = Error::validation("Value required but not found");
        assert_eq!(
            err.to_string(),
            "validation failed: Value required but not found"
        );
    }

    #[test]
    fn cache_miss_display() {
        let err = Error::CacheMiss("SongRecord".to_string());
        assert_eq!(err.to_string(), "cache miss for type: SongRecord");
    }

    #[test]
    fn classification() {
        assert!(Error::validation("x").is_validation());
        assert!(Error::conversion("x").is_conversion());
        assert!(Error::NoVariant("x".into()).is_resolution());
        assert!(Error::config("x").is_config());
        assert!(Error::Uncachable("x".into()).is_registry());
        assert!(!Error::validation("x").is_conversion());
    }

    #[test]
    fn path_error_conversion() {
        let err: Error = PathError::EmptySegment.into();
        assert!(matches!(err, Error::Path(PathError::EmptySegment)));
    }
}
