//! The type contract and instance plumbing
//!
//! Every live type implements [`Type`]: it owns a [`TypeCore`] holding its
//! shared [`Definition`], resolved [`TypeOptions`], and the instance's
//! validator list, and provides [`Type::convert`] for its representation.
//! Everything else (default substitution, coercibility checks, the
//! validation pipeline, schematic export) is shared behaviour built on those
//! three pieces.
//!
//! Instances are created through [`TypeBuilder`], which resolves explicit
//! options over definition presets over declared defaults.

mod composite;
mod primitive;
mod record;

pub use composite::{ItemPolicy, ListType, SumType};
pub use primitive::{
    string_convert, string_core, string_is_falsy, AnyType, BooleanType, FloatType, IntegerType,
    PrimitiveType, StringType,
};
pub use record::{Record, RecordOptions};

pub(crate) use composite::{CONTAINER, LIST, SUM};
pub(crate) use primitive::{BOOLEAN, FLOAT, INTEGER, NUMBER, PRIMITIVE, STRING, TYPE};
pub(crate) use record::RECORD;

use std::any::Any;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::constraint::Constraint;
use crate::declaration::{Schematic, Settings};
use crate::definition::{Definition, Validator};
use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::value::Value;

/// Target representation of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// In-memory form
    Native,
    /// Serializable form
    Primitive,
}

/// Upcasts shared by every [`Type`]
pub trait AsType {
    /// View as a type trait object
    fn as_type(&self) -> &dyn Type;
    /// View as `Any` for downcasting to a concrete type
    fn as_any(&self) -> &dyn Any;
}

impl<T: Type + 'static> AsType for T {
    fn as_type(&self) -> &dyn Type {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A configured type instance
pub trait Type: AsType + Send + Sync + Debug {
    /// Shared configuration and composed metadata
    fn core(&self) -> &TypeCore;

    /// Convert a value into the requested representation
    ///
    /// Default substitution has already happened. `paths` restricts nested
    /// records to the named fields.
    ///
    /// # Errors
    /// Returns [`Error::Conversion`] when the value cannot be coerced
    fn convert(&self, value: &Value, direction: Direction, paths: Option<&[FieldPath]>)
        -> Result<Value>;

    /// Type name
    fn name(&self) -> &str {
        self.core().definition().name()
    }

    /// Shared definition
    fn definition(&self) -> &Arc<Definition> {
        self.core().definition()
    }

    /// Resolved options
    fn options(&self) -> &TypeOptions {
        self.core().options()
    }

    /// Configured default, `Unset` when none
    fn default_value(&self) -> &Value {
        &self.options().default
    }

    /// Check if the value counts as "no value" for this type
    fn is_falsy(&self, value: &Value) -> bool {
        value.is_absent()
    }

    /// Check if the value is already in native form
    fn is_type_match(&self, value: &Value) -> bool {
        self.definition().native().matches(value)
    }

    /// Check if the value converts to native form without error
    fn is_coercible(&self, value: &Value) -> bool {
        if self.options().strict {
            return self.is_type_match(value);
        }
        self.to_native(value).is_ok()
    }

    /// Convert to native form
    ///
    /// # Errors
    /// See [`Type::convert`]
    fn to_native(&self, value: &Value) -> Result<Value> {
        self.to_native_with(value, None)
    }

    /// Convert to native form, restricted to field paths
    ///
    /// # Errors
    /// See [`Type::convert`]
    fn to_native_with(&self, value: &Value, paths: Option<&[FieldPath]>) -> Result<Value> {
        self.convert(substitute_default(self.as_type(), value), Direction::Native, paths)
    }

    /// Convert to primitive form
    ///
    /// # Errors
    /// See [`Type::convert`]
    fn to_primitive(&self, value: &Value) -> Result<Value> {
        self.to_primitive_with(value, None)
    }

    /// Convert to primitive form, restricted to field paths
    ///
    /// # Errors
    /// See [`Type::convert`]
    fn to_primitive_with(&self, value: &Value, paths: Option<&[FieldPath]>) -> Result<Value> {
        self.convert(substitute_default(self.as_type(), value), Direction::Primitive, paths)
    }

    /// The value handed to validators
    ///
    /// # Errors
    /// See [`Type::convert`]
    fn native_for_validation(&self, value: &Value) -> Result<Value> {
        self.to_native(value)
    }

    /// Run the validation pipeline
    ///
    /// 1. a required type rejects `Unset`
    /// 2. a present value must match (strict) or coerce to the native form
    /// 3. every validator runs, in order, against the converted value
    ///
    /// # Errors
    /// Returns the first failure; validator failures are
    /// [`Error::Validation`] unless a nested sum type fails to resolve
    fn validate(&self, value: &Value) -> Result<()> {
        let options = self.options();
        if options.required && value.is_unset() {
            return Err(Error::validation("Value required but not found"));
        }

        if !self.is_falsy(value) {
            let matched = if options.strict {
                self.is_type_match(value)
            } else {
                self.is_coercible(value)
            };
            if !matched {
                return Err(Error::validation(format!(
                    "Value doesn't match type format {value}"
                )));
            }
        }

        let native = self.native_for_validation(value)?;
        let ty = self.as_type();
        for (name, validator) in self.core().validators() {
            if let Err(e) = validator(ty, &native) {
                debug!(ty = self.name(), validator = %name, error = %e, "validator failed");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Describe this instance as constructed
    fn to_schematic(&self) -> Schematic {
        Schematic::options(self.name(), self.core().constructed().clone())
    }
}

fn substitute_default<'v>(ty: &'v dyn Type, value: &'v Value) -> &'v Value {
    let default = ty.default_value();
    if value.is_absent() && !default.is_unset() {
        default
    } else {
        value
    }
}

/// Options every type understands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeOptions {
    /// Value substituted for `Unset` or `Null` before conversion
    pub default: Value,
    /// Reject `Unset` during validation
    pub required: bool,
    /// Demand native form instead of coercibility
    pub strict: bool,
    /// Allowed values, when the definition declares choices
    pub choices: Option<Vec<Value>>,
}

impl TypeOptions {
    /// Read common options from resolved settings
    ///
    /// # Errors
    /// Returns [`Error::Config`] for malformed options
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            default: settings.get("default").clone(),
            required: settings.flag("required")?,
            strict: settings.flag("strict")?,
            choices: settings.list("choices")?,
        })
    }
}

/// Per-instance state shared by all type implementations
#[derive(Clone)]
pub struct TypeCore {
    definition: Arc<Definition>,
    options: TypeOptions,
    validators: IndexMap<String, Validator>,
    constructed: IndexMap<String, Value>,
}

impl TypeCore {
    /// Bind a definition to resolved settings
    ///
    /// # Errors
    /// Returns [`Error::Config`] for malformed common options
    pub fn new(definition: Arc<Definition>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            options: TypeOptions::from_settings(settings)?,
            validators: definition.validators().clone(),
            constructed: settings.values().clone(),
            definition,
        })
    }

    /// Add a constraint's validators after the definition's
    #[must_use]
    pub fn with_constraint(mut self, constraint: &dyn Constraint) -> Self {
        constraint.attach(&mut self.validators);
        self
    }

    /// Shared definition
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }

    /// Resolved common options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &TypeOptions {
        &self.options
    }

    /// Validators in run order
    #[inline]
    #[must_use]
    pub fn validators(&self) -> &IndexMap<String, Validator> {
        &self.validators
    }

    /// Options as resolved at construction
    #[inline]
    #[must_use]
    pub fn constructed(&self) -> &IndexMap<String, Value> {
        &self.constructed
    }
}

impl Debug for TypeCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCore")
            .field("definition", &self.definition.name())
            .field("options", &self.constructed)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A type constructible through [`TypeBuilder`]
pub trait Configurable: Type + Sized {
    /// Structural parameters that are not options (variants, element type)
    type Params;

    /// The definition every instance must descend from
    fn base_definition() -> &'static Arc<Definition>;

    /// Create an instance from resolved settings
    ///
    /// # Errors
    /// Returns [`Error::Config`] for malformed settings
    fn construct(definition: Arc<Definition>, settings: &Settings, params: Self::Params)
        -> Result<Self>;
}

/// Marker for types accepting `min_length` / `max_length`
pub trait LengthOptions: Configurable {}

/// Marker for types accepting `min` / `max`
pub trait RangeOptions: Configurable {}

/// Marker for types accepting a `regex`
pub trait PatternOptions: Configurable {}

/// Builder for type instances
///
/// ```ignore
/// let title = StringType::builder()
///     .required(true)
///     .max_length(40)
///     .build()?;
/// ```
pub struct TypeBuilder<T: Configurable> {
    definition: Arc<Definition>,
    args: IndexMap<String, Value>,
    params: T::Params,
    _type: PhantomData<fn() -> T>,
}

impl<T: Configurable> TypeBuilder<T> {
    /// Build against the type's base definition
    #[must_use]
    pub fn with_params(params: T::Params) -> Self {
        Self::from_definition(T::base_definition(), params)
    }

    /// Build against a derived definition
    ///
    /// The definition is checked to descend from the base at [`build`](Self::build).
    #[must_use]
    pub fn from_definition(definition: &Arc<Definition>, params: T::Params) -> Self {
        Self {
            definition: Arc::clone(definition),
            args: IndexMap::new(),
            params,
            _type: PhantomData,
        }
    }

    /// Set any declared option by name
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Set options from a JSON object
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `json` is not an object
    pub fn options_from_json(mut self, json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(Error::config("type options must be a JSON object"));
        };
        for (name, value) in map {
            self.args.insert(name, Value::from(value));
        }
        Ok(self)
    }

    /// Value used when the input is `Unset` or `Null`
    #[must_use]
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.option("default", value)
    }

    /// Reject `Unset` during validation
    #[must_use]
    pub fn required(self, required: bool) -> Self {
        self.option("required", required)
    }

    /// Demand native form during validation
    #[must_use]
    pub fn strict(self, strict: bool) -> Self {
        self.option("strict", strict)
    }

    /// Restrict values to a fixed set
    #[must_use]
    pub fn choices<I, V>(self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list: Vec<Value> = choices.into_iter().map(Into::into).collect();
        self.option("choices", list)
    }

    /// Resolve options and construct the instance
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an unrelated definition, an unknown
    /// option, or malformed option values
    pub fn build(self) -> Result<T> {
        let base = T::base_definition();
        if !self.definition.is_subtype_of(base) {
            return Err(Error::config(format!(
                "{} does not descend from {}",
                self.definition.name(),
                base.name()
            )));
        }
        let declaration = self.definition.declaration();
        let settings = declaration.resolve(&self.args)?;
        let built = T::construct(Arc::clone(&self.definition), &settings, self.params)?;
        declaration.capture(&settings);
        Ok(built)
    }
}

impl<T: Configurable<Params = ()>> TypeBuilder<T> {
    /// Build against the type's base definition
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(())
    }
}

impl<T: Configurable<Params = ()>> Default for TypeBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LengthOptions> TypeBuilder<T> {
    /// Minimum length; empty values are not checked
    #[must_use]
    pub fn min_length(self, min: usize) -> Self {
        self.option("min_length", min)
    }

    /// Maximum length
    #[must_use]
    pub fn max_length(self, max: usize) -> Self {
        self.option("max_length", max)
    }
}

impl<T: RangeOptions> TypeBuilder<T> {
    /// Inclusive lower bound
    #[must_use]
    pub fn min(self, min: impl Into<Value>) -> Self {
        self.option("min", min)
    }

    /// Inclusive upper bound
    #[must_use]
    pub fn max(self, max: impl Into<Value>) -> Self {
        self.option("max", max)
    }
}

impl<T: PatternOptions> TypeBuilder<T> {
    /// Pattern the value must match from its start
    #[must_use]
    pub fn regex(self, pattern: impl Into<String>) -> Self {
        self.option("regex", pattern.into())
    }
}

/// Share a type instance as a trait object
#[inline]
#[must_use]
pub fn shared<T: Type + 'static>(ty: T) -> Arc<dyn Type> {
    Arc::new(ty)
}

/// The root definition every type descends from
#[must_use]
pub fn root_definition() -> &'static Arc<Definition> {
    &TYPE
}

/// Downcast a type object to a concrete type
#[must_use]
pub fn downcast<T: Type + 'static>(ty: &dyn Type) -> Option<&T> {
    ty.as_any().downcast_ref::<T>()
}
