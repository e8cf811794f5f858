//! Built-in scalar types
//!
//! `Type` is the root definition; `Primitive` adds allow-lists. Booleans,
//! strings and numbers coerce common representations into their native form.

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{Configurable, Direction, LengthOptions, PatternOptions, RangeOptions, Type, TypeBuilder, TypeCore};
use crate::constraint::{LengthConstraint, PatternConstraint, RangeConstraint};
use crate::declaration::Settings;
use crate::definition::{Definition, DefinitionBuilder};
use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::value::{Native, Value};

pub(crate) static TYPE: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("Type")
        .native(Native::Identity)
        .option("default", Value::Unset)
        .option("required", false)
        .option("strict", false)
        .build()
});

pub(crate) static PRIMITIVE: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("Primitive")
        .extends(&TYPE)
        .option("choices", Value::Null)
        .validator("choices", validate_choices)
        .build()
});

pub(crate) static BOOLEAN: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("BooleanType")
        .extends(&PRIMITIVE)
        .native(Native::Bool)
        .validator("boolean", validate_boolean)
        .build()
});

pub(crate) static STRING: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("StringType")
        .extends(&PRIMITIVE)
        .native(Native::Str)
        .option("max_length", Value::Null)
        .option("min_length", Value::Null)
        .option("regex", Value::Null)
        .build()
});

pub(crate) static NUMBER: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("Number")
        .extends(&PRIMITIVE)
        .option("max", Value::Null)
        .option("min", Value::Null)
        .build()
});

pub(crate) static INTEGER: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("IntegerType")
        .extends(&NUMBER)
        .native(Native::Int)
        .build()
});

pub(crate) static FLOAT: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("FloatType")
        .extends(&NUMBER)
        .native(Native::Float)
        .build()
});

fn validate_choices(ty: &dyn Type, value: &Value) -> Result<()> {
    match &ty.options().choices {
        Some(choices) if !choices.is_empty() => {
            if value.is_unset() || !choices.contains(value) {
                return Err(Error::validation(format!("Illegal choice for value: {value}")));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_boolean(_: &dyn Type, value: &Value) -> Result<()> {
    if value.is_absent() {
        return Ok(());
    }
    parse_bool(value).map(|_| ()).map_err(|e| match e {
        Error::Conversion(msg) => Error::Validation(msg),
        other => other,
    })
}

fn parse_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Str(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::Str(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(x) => Ok(x.abs() > 0.0),
        other => Err(Error::conversion(format!("Value is not a boolean: {other}"))),
    }
}

/// Text form of a scalar, used by string coercion
pub(crate) fn scalar_text(value: &Value) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::DateTime(_) | Value::Time(_) => {
            Ok(value.to_string())
        }
        other => Err(Error::conversion(format!(
            "Could not convert to string: {} {other}",
            other.kind()
        ))),
    }
}

/// The root type: no coercion, only the common options
#[derive(Debug, Clone)]
pub struct AnyType {
    core: TypeCore,
}

impl AnyType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

impl Configurable for AnyType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &TYPE
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: TypeCore::new(definition, settings)?,
        })
    }
}

impl Type for AnyType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn convert(&self, value: &Value, _: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Identity type with an optional allow-list
#[derive(Debug, Clone)]
pub struct PrimitiveType {
    core: TypeCore,
}

impl PrimitiveType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

impl Configurable for PrimitiveType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &PRIMITIVE
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: TypeCore::new(definition, settings)?,
        })
    }
}

impl Type for PrimitiveType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn convert(&self, value: &Value, _: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Boolean with lenient coercion from strings and numbers
#[derive(Debug, Clone)]
pub struct BooleanType {
    core: TypeCore,
}

impl BooleanType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

impl Configurable for BooleanType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &BOOLEAN
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: TypeCore::new(definition, settings)?,
        })
    }
}

impl Type for BooleanType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn convert(&self, value: &Value, _: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        parse_bool(value).map(Value::Bool)
    }
}

/// Text with optional length bounds and pattern
#[derive(Debug, Clone)]
pub struct StringType {
    core: TypeCore,
}

impl StringType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

/// Attach the length and pattern modules a string-like type declares
///
/// # Errors
/// Returns [`Error::Config`] for malformed bounds or an invalid pattern
pub fn string_core(definition: Arc<Definition>, settings: &Settings) -> Result<TypeCore> {
    let length = LengthConstraint::from_settings(settings)?;
    let mut core = TypeCore::new(definition, settings)?.with_constraint(&length);
    if let Some(pattern) = PatternConstraint::from_settings(settings)? {
        core = core.with_constraint(&pattern);
    }
    Ok(core)
}

/// Coerce a scalar to text, leaving falsy input untouched
///
/// # Errors
/// Returns [`Error::Conversion`] for lists and mappings
pub fn string_convert(ty: &dyn Type, value: &Value) -> Result<Value> {
    if ty.is_falsy(value) {
        return Ok(value.clone());
    }
    scalar_text(value).map(Value::Str)
}

/// Falsiness shared by string-like types: absent or empty
#[must_use]
pub fn string_is_falsy(value: &Value) -> bool {
    value.is_absent() || matches!(value, Value::Str(s) if s.is_empty())
}

impl Configurable for StringType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &STRING
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: string_core(definition, settings)?,
        })
    }
}

impl LengthOptions for StringType {}
impl PatternOptions for StringType {}

impl Type for StringType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn is_falsy(&self, value: &Value) -> bool {
        string_is_falsy(value)
    }

    fn convert(&self, value: &Value, _: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        string_convert(self, value)
    }
}

/// Whole numbers; floats truncate toward zero
#[derive(Debug, Clone)]
pub struct IntegerType {
    core: TypeCore,
}

impl IntegerType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

fn number_core(definition: Arc<Definition>, settings: &Settings) -> Result<TypeCore> {
    let range = RangeConstraint::from_settings(settings)?;
    Ok(TypeCore::new(definition, settings)?.with_constraint(&range))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn to_integer(value: &Value) -> Result<i64> {
    let out_of_range = || Error::conversion(format!("Value is not an integer: {value}"));
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Float(x) => {
            let t = x.trunc();
            if t.is_finite() && t >= i64::MIN as f64 && t <= i64::MAX as f64 {
                Ok(t as i64)
            } else {
                Err(out_of_range())
            }
        }
        Value::Str(s) => s.trim().parse().map_err(|_| out_of_range()),
        _ => Err(out_of_range()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_float(value: &Value) -> Result<f64> {
    match value {
        Value::Float(x) => Ok(*x),
        Value::Int(i) => Ok(*i as f64),
        Value::Bool(b) => Ok(f64::from(u8::from(*b))),
        Value::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| Error::conversion(format!("Value is not a float: {value}"))),
        other => Err(Error::conversion(format!("Value is not a float: {other}"))),
    }
}

impl Configurable for IntegerType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &INTEGER
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: number_core(definition, settings)?,
        })
    }
}

impl RangeOptions for IntegerType {}

impl Type for IntegerType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn convert(&self, value: &Value, _: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        to_integer(value).map(Value::Int)
    }
}

/// Floating point numbers
#[derive(Debug, Clone)]
pub struct FloatType {
    core: TypeCore,
}

impl FloatType {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

impl Configurable for FloatType {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &FLOAT
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: number_core(definition, settings)?,
        })
    }
}

impl RangeOptions for FloatType {}

impl Type for FloatType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn convert(&self, value: &Value, _: Direction, _: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        to_float(value).map(Value::Float)
    }
}
