//! Identifier types

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::trace;
use typerighter_core::types::{string_core, string_is_falsy, LengthOptions, PatternOptions};
use typerighter_core::{
    Configurable, Definition, DefinitionBuilder, Direction, Error, FieldPath, Result, Settings,
    StringType, Type, TypeBuilder, TypeCore, Value,
};
use uuid::Uuid;

const UUID_SIMPLE: &str = "(?i)^[a-z0-9]{32}$";

static UUID: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("UUIDType")
        .extends(StringType::base_definition())
        .preset("regex", UUID_SIMPLE)
        .build()
});

/// UUID in its 32-character simple form
///
/// Hyphenated, braced and URN inputs are accepted and normalized on
/// conversion, in either direction.
#[derive(Debug, Clone)]
pub struct UuidType {
    core: TypeCore,
}

impl UuidType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }

    /// A fresh random (v4) UUID in simple form
    #[must_use]
    pub fn generate() -> Value {
        Value::Str(Uuid::new_v4().simple().to_string())
    }
}

fn normalize(text: &str) -> Result<String> {
    Uuid::parse_str(text)
        .map(|id| id.simple().to_string())
        .map_err(|e| Error::conversion(format!("Value is not a UUID: {text} ({e})")))
}

impl Configurable for UuidType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &UUID
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: string_core(definition, settings)?,
        })
    }
}

impl LengthOptions for UuidType {}
impl PatternOptions for UuidType {}

impl Type for UuidType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn is_falsy(&self, value: &Value) -> bool {
        string_is_falsy(value)
    }

    fn is_type_match(&self, value: &Value) -> bool {
        matches!(value, Value::Str(s) if s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit()))
    }

    fn convert(&self, value: &Value, direction: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        match value {
            Value::Str(text) => {
                let simple = normalize(text)?;
                trace!(?direction, input = %text, "normalized uuid");
                Ok(Value::Str(simple))
            }
            other => Err(Error::conversion(format!(
                "Value is not a UUID: {} {other}",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "67e5504410b1426f9247bb680e5fe0c8";
    const HYPHENATED: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    #[test]
    fn normalizes_to_simple_form() {
        let id = UuidType::builder().build().unwrap();
        let expected = Value::from(SIMPLE);
        assert_eq!(id.to_native(&Value::from(HYPHENATED)).unwrap(), expected);
        assert_eq!(id.to_primitive(&Value::from(HYPHENATED)).unwrap(), expected);
        assert_eq!(id.to_native(&Value::from(SIMPLE.to_uppercase())).unwrap(), expected);
    }

    #[test]
    fn primitive_is_idempotent() {
        let id = UuidType::builder().build().unwrap();
        let once = id.to_primitive(&Value::from(HYPHENATED)).unwrap();
        let twice = id.to_primitive(&id.to_native(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn validation() {
        let id = UuidType::builder().build().unwrap();
        assert!(id.validate(&Value::from(SIMPLE)).is_ok());
        assert!(id.validate(&Value::from(HYPHENATED)).is_ok());
        assert!(id.validate(&Value::Unset).is_ok());
        assert!(id.validate(&Value::from("weeeeeee")).is_err());
        assert!(id.validate(&Value::Int(7)).is_err());
    }

    #[test]
    fn strict_requires_simple_form() {
        let id = UuidType::builder().strict(true).build().unwrap();
        assert!(id.validate(&Value::from(SIMPLE)).is_ok());
        assert!(id.validate(&Value::from(HYPHENATED)).is_err());
    }

    #[test]
    fn generated_ids_validate() {
        let id = UuidType::builder().required(true).build().unwrap();
        let fresh = UuidType::generate();
        assert!(id.is_type_match(&fresh));
        assert!(id.validate(&fresh).is_ok());
        assert_ne!(fresh, UuidType::generate());
    }

    #[test]
    fn non_string_is_conversion_error() {
        let id = UuidType::builder().build().unwrap();
        assert!(id.to_native(&Value::Bool(true)).unwrap_err().is_conversion());
    }
}
