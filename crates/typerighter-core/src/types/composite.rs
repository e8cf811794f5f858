//! Sum types and containers

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::trace;

use super::primitive::PRIMITIVE;
use super::{downcast, Configurable, Direction, LengthOptions, Type, TypeBuilder, TypeCore};
use crate::constraint::LengthConstraint;
use crate::declaration::{Schematic, Settings};
use crate::definition::{Definition, DefinitionBuilder};
use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::value::{Native, Value};

pub(crate) static SUM: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("SumType")
        .extends(&PRIMITIVE)
        .validator("by_variant_match", validate_by_variant_match)
        .build()
});

pub(crate) static CONTAINER: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("Container")
        .extends(&PRIMITIVE)
        .option("max_length", Value::Null)
        .option("min_length", Value::Null)
        .option("item_policy", ItemPolicy::All.as_str())
        .validator("items", validate_items)
        .build()
});

pub(crate) static LIST: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("ListType")
        .extends(&CONTAINER)
        .native(Native::List)
        .build()
});

fn validate_by_variant_match(ty: &dyn Type, value: &Value) -> Result<()> {
    let sum = downcast::<SumType>(ty)
        .ok_or_else(|| Error::validation(format!("{} is not a sum type", ty.name())))?;
    sum.find_variant(value).map(|_| ())
}

fn validate_items(ty: &dyn Type, value: &Value) -> Result<()> {
    let list = downcast::<ListType>(ty)
        .ok_or_else(|| Error::validation(format!("Container is an abstract type: {}", ty.name())))?;
    list.validate_items(value)
}

/// A value accepted by any one of several variant types
///
/// The first variant that validates a value is the one used to convert it.
#[derive(Debug, Clone)]
pub struct SumType {
    core: TypeCore,
    variants: Vec<Arc<dyn Type>>,
}

impl SumType {
    /// Start a builder; add variants with [`TypeBuilder::variant`]
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::with_params(Vec::new())
    }

    /// Variant types in declaration order
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[Arc<dyn Type>] {
        &self.variants
    }

    /// First variant whose validation accepts the value
    ///
    /// # Errors
    /// Returns [`Error::NoVariant`] when no variant accepts the value;
    /// non-validation failures from a variant propagate unchanged
    pub fn find_variant(&self, value: &Value) -> Result<&Arc<dyn Type>> {
        for variant in &self.variants {
            match variant.validate(value) {
                Ok(()) => {
                    trace!(sum = self.name(), variant = variant.name(), "resolved variant");
                    return Ok(variant);
                }
                Err(e) if e.is_validation() => {}
                Err(e) => return Err(e),
            }
        }
        Err(Error::NoVariant(value.to_string()))
    }
}

impl TypeBuilder<SumType> {
    /// Add a variant
    #[must_use]
    pub fn variant(self, ty: impl Type + 'static) -> Self {
        self.shared_variant(Arc::new(ty))
    }

    /// Add an already shared variant
    #[must_use]
    pub fn shared_variant(mut self, ty: Arc<dyn Type>) -> Self {
        self.params.push(ty);
        self
    }
}

impl Configurable for SumType {
    type Params = Vec<Arc<dyn Type>>;

    fn base_definition() -> &'static Arc<Definition> {
        &SUM
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, variants: Self::Params) -> Result<Self> {
        if variants.is_empty() {
            return Err(Error::config("a sum type needs at least one variant"));
        }
        Ok(Self {
            core: TypeCore::new(definition, settings)?,
            variants,
        })
    }
}

impl Type for SumType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn is_type_match(&self, value: &Value) -> bool {
        self.variants.iter().any(|v| v.is_type_match(value))
    }

    fn convert(&self, value: &Value, direction: Direction, paths: Option<&[FieldPath]>) -> Result<Value> {
        let variant = self.find_variant(value)?;
        match direction {
            Direction::Native => variant.to_native_with(value, paths),
            Direction::Primitive => variant.to_primitive_with(value, paths),
        }
    }

    fn to_schematic(&self) -> Schematic {
        Schematic::variants(
            self.name(),
            self.variants.iter().map(|v| v.to_schematic()).collect(),
        )
    }
}

/// How a container validates its elements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ItemPolicy {
    /// Every element must validate; the first failure is reported
    #[default]
    All,
    /// Passes as soon as one element validates
    Any,
}

impl ItemPolicy {
    /// Option value for this policy
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ItemPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            other => Err(Error::config(format!("unknown item policy: {other}"))),
        }
    }
}

/// Homogeneous list of one element type
#[derive(Debug, Clone)]
pub struct ListType {
    core: TypeCore,
    element: Arc<dyn Type>,
    policy: ItemPolicy,
}

impl ListType {
    /// Start a builder for lists of `element`
    #[must_use]
    pub fn builder(element: impl Type + 'static) -> TypeBuilder<Self> {
        TypeBuilder::with_params(Arc::new(element) as Arc<dyn Type>)
    }

    /// Start a builder with an already shared element type
    #[must_use]
    pub fn shared_builder(element: Arc<dyn Type>) -> TypeBuilder<Self> {
        TypeBuilder::with_params(element)
    }

    /// Element type
    #[inline]
    #[must_use]
    pub fn element(&self) -> &Arc<dyn Type> {
        &self.element
    }

    /// Item validation policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ItemPolicy {
        self.policy
    }

    /// Validate elements under the configured policy
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming the failing element
    pub fn validate_items(&self, value: &Value) -> Result<()> {
        if self.is_falsy(value) {
            return Ok(());
        }
        let items = value
            .as_list()
            .ok_or_else(|| Error::validation(format!("Value is not a list: {value}")))?;

        match self.policy {
            ItemPolicy::All => {
                for (index, item) in items.iter().enumerate() {
                    self.element.validate(item).map_err(|e| match e {
                        Error::Validation(msg) => Error::Validation(format!(
                            "Item {index} failed validation ({item}): {msg}"
                        )),
                        other => other,
                    })?;
                }
                Ok(())
            }
            ItemPolicy::Any => {
                for item in items {
                    match self.element.validate(item) {
                        Ok(()) => return Ok(()),
                        Err(e) if e.is_validation() => {}
                        Err(e) => return Err(e),
                    }
                }
                Err(Error::validation(format!("No types in list match for item {value}")))
            }
        }
    }
}

impl TypeBuilder<ListType> {
    /// Choose how elements are validated
    #[must_use]
    pub fn item_policy(self, policy: ItemPolicy) -> Self {
        self.option("item_policy", policy.as_str())
    }
}

impl Configurable for ListType {
    type Params = Arc<dyn Type>;

    fn base_definition() -> &'static Arc<Definition> {
        &LIST
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, element: Self::Params) -> Result<Self> {
        let policy = settings
            .text("item_policy")?
            .as_deref()
            .map_or(Ok(ItemPolicy::default()), str::parse)?;
        let length = LengthConstraint::from_settings(settings)?;
        Ok(Self {
            core: TypeCore::new(definition, settings)?.with_constraint(&length),
            element,
            policy,
        })
    }
}

impl LengthOptions for ListType {}

impl Type for ListType {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn is_falsy(&self, value: &Value) -> bool {
        value.is_absent() || value.len() == Some(0)
    }

    fn convert(&self, value: &Value, direction: Direction, paths: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        let items = value
            .as_list()
            .ok_or_else(|| Error::conversion(format!("Value is not a list: {value}")))?;
        let converted = items
            .iter()
            .map(|item| match direction {
                Direction::Native => self.element.to_native_with(item, paths),
                Direction::Primitive => self.element.to_primitive_with(item, paths),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::List(converted))
    }

    fn to_schematic(&self) -> Schematic {
        Schematic::container(
            self.name(),
            self.core.constructed().clone(),
            self.element.to_schematic(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrimitiveType, StringType};

    fn strings(min: usize) -> StringType {
        StringType::builder().min_length(min).build().unwrap()
    }

    #[test]
    fn sum_picks_first_accepting_variant() {
        let sum = SumType::builder()
            .variant(StringType::builder().min_length(7).build().unwrap())
            .variant(StringType::builder().max_length(3).build().unwrap())
            .build()
            .unwrap();
        assert!(sum.validate(&"li".into()).is_ok());
        assert!(sum.validate(&"of strings".into()).is_ok());
        assert!(sum.validate(&"four".into()).is_err());
    }

    #[test]
    fn sum_strict_variant_rejects_coercible() {
        let sum = SumType::builder()
            .variant(StringType::builder().strict(true).build().unwrap())
            .required(true)
            .build()
            .unwrap();
        assert!(sum.validate(&Value::Int(1)).unwrap_err().is_validation());
    }

    #[test]
    fn sum_without_accepting_variant_is_resolution_error() {
        let required = || PrimitiveType::builder().required(true).build().unwrap();
        let sum = SumType::builder().variant(required()).variant(required()).build().unwrap();
        assert!(sum.validate(&Value::Unset).unwrap_err().is_resolution());
        assert!(sum.to_native(&Value::Unset).unwrap_err().is_resolution());
    }

    #[test]
    fn sum_requires_variants() {
        assert!(SumType::builder().build().unwrap_err().is_config());
    }

    #[test]
    fn sum_schematic_lists_variants() {
        let sum = SumType::builder()
            .variant(StringType::builder().build().unwrap())
            .variant(PrimitiveType::builder().build().unwrap())
            .build()
            .unwrap();
        let json = sum.to_schematic().to_json();
        assert_eq!(json[0], "SumType");
        assert_eq!(json[1][0][0], "StringType");
        assert_eq!(json[1][1][0], "Primitive");
    }

    #[test]
    fn list_converts_each_element() {
        let list = ListType::builder(strings(5)).build().unwrap();
        let raw = Value::List(vec!["data".into(), Value::Int(4)]);
        assert_eq!(
            list.to_primitive(&raw).unwrap(),
            Value::List(vec!["data".into(), "4".into()])
        );
        assert!(list.to_native(&"nope".into()).unwrap_err().is_conversion());
    }

    #[test]
    fn list_min_length() {
        let list = ListType::builder(StringType::builder().build().unwrap())
            .min_length(3)
            .build()
            .unwrap();
        assert!(list.validate(&Value::List(vec![])).is_ok());
        assert!(list.validate(&Value::Null).is_ok());
        assert!(list.validate(&Value::Unset).is_ok());
        assert!(list.validate(&Value::from(serde_json::json!(["a", "b"]))).is_err());
        assert!(list.validate(&Value::from(serde_json::json!(["a", "b", "c"]))).is_ok());
    }

    #[test]
    fn list_all_policy_names_failing_item() {
        let list = ListType::builder(strings(3)).build().unwrap();
        assert!(list.validate(&Value::from(serde_json::json!(["abc", "defg"]))).is_ok());
        let err = list
            .validate(&Value::from(serde_json::json!(["abc", "de"])))
            .unwrap_err();
        assert!(err.to_string().contains("Item 1"));
    }

    #[test]
    fn list_any_policy_passes_on_first_success() {
        let list = ListType::builder(strings(3))
            .item_policy(ItemPolicy::Any)
            .build()
            .unwrap();
        assert_eq!(list.policy(), ItemPolicy::Any);
        assert!(list.validate(&Value::from(serde_json::json!(["abc", "de"]))).is_ok());
        assert!(list.validate(&Value::from(serde_json::json!(["a", "de"]))).is_err());
    }

    #[test]
    fn list_rejects_unknown_policy() {
        let err = ListType::builder(strings(1))
            .option("item_policy", "some")
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn list_schematic_includes_element() {
        let list = ListType::builder(strings(2)).build().unwrap();
        let json = list.to_schematic().to_json();
        assert_eq!(json[0], "ListType");
        assert_eq!(json[1]["item_policy"], "all");
        assert_eq!(json[1]["type"][0], "StringType");
        assert_eq!(json[1]["type"][1]["min_length"], 2);
    }
}
