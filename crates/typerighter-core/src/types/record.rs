//! Structured records of named fields
//!
//! A record's shape lives in its [`Definition`]: fields are declared on a
//! definition extending [`Record`]'s base and composed through ancestry like
//! validators. A `Record` instance adds per-use options (`strict`, default
//! field filters, whether `Null` fields are exported).

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use super::primitive::TYPE;
use super::{downcast, Configurable, Direction, Type, TypeBuilder, TypeCore};
use crate::declaration::Settings;
use crate::definition::{Definition, DefinitionBuilder};
use crate::error::{Error, Result};
use crate::path::{FieldFilter, FieldPath};
use crate::value::{Map, Native, Value};
use crate::view::{View, ViewMode};

pub(crate) static RECORD: Lazy<Arc<Definition>> = Lazy::new(|| {
    DefinitionBuilder::new("Record")
        .extends(&TYPE)
        .native(Native::Map)
        .option("field_filters", Value::Null)
        .option("export_nones", false)
        .validator("fields", validate_fields)
        .build()
});

fn validate_fields(ty: &dyn Type, value: &Value) -> Result<()> {
    let record = downcast::<Record>(ty)
        .ok_or_else(|| Error::validation(format!("{} is not a record", ty.name())))?;
    record.validate_fields(value)
}

/// Record-specific options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordOptions {
    /// Paths applied when a conversion supplies none
    pub field_filters: Option<Vec<FieldPath>>,
    /// Keep `Null` fields in primitive output
    pub export_nones: bool,
}

impl RecordOptions {
    fn from_settings(settings: &Settings) -> Result<Self> {
        let field_filters = match settings.list("field_filters")? {
            Some(raw) => {
                let texts = raw
                    .iter()
                    .map(|v| {
                        v.as_str().ok_or_else(|| {
                            Error::config(format!("field filter must be a string: {v}"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Some(FieldPath::parse_all(&texts)?)
            }
            None => None,
        };
        Ok(Self {
            field_filters,
            export_nones: settings.flag("export_nones")?,
        })
    }
}

/// A mapping of declared fields to typed values
#[derive(Debug, Clone)]
pub struct Record {
    core: TypeCore,
    record_options: RecordOptions,
}

impl Record {
    /// Start a builder for a record definition
    ///
    /// `definition` must extend the base record definition.
    #[must_use]
    pub fn builder(definition: &Arc<Definition>) -> TypeBuilder<Self> {
        TypeBuilder::from_definition(definition, ())
    }

    /// Start a record definition extending the base record
    #[must_use]
    pub fn define(name: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder::new(name).extends(&RECORD)
    }

    /// Record-specific options
    #[inline]
    #[must_use]
    pub fn record_options(&self) -> &RecordOptions {
        &self.record_options
    }

    /// Declared fields in composed order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Arc<dyn Type>)> {
        self.definition()
            .fields()
            .iter()
            .map(|(name, ty)| (name.as_str(), ty))
    }

    /// Type of one declared field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<dyn Type>> {
        self.definition().field(name)
    }

    /// Bind data to a view of this record
    ///
    /// # Errors
    /// Returns conversion errors from the chosen [`ViewMode`]
    pub fn to_view(&self, data: &Value, mode: ViewMode) -> Result<View<'_>> {
        View::new(self, data, mode)
    }

    /// Validate every declared field against the mapping
    ///
    /// Absent fields validate as `Unset`, so a required field fails even when
    /// it carries a default. Stops at the first failing field.
    ///
    /// # Errors
    /// Returns the first field failure
    pub fn validate_fields(&self, value: &Value) -> Result<()> {
        if self.is_falsy(value) {
            return Ok(());
        }
        let map = value
            .as_map()
            .ok_or_else(|| Error::validation(format!("Record value is not a mapping: {value}")))?;
        for (name, ty) in self.fields() {
            let field_value = map.get(name).unwrap_or(&Value::Unset);
            ty.validate(field_value).map_err(|e| {
                debug!(record = self.name(), field = name, error = %e, "field failed validation");
                e
            })?;
        }
        Ok(())
    }

    fn convert_fields(&self, map: &Map, direction: Direction, paths: Option<&[FieldPath]>) -> Result<Map> {
        let filter = paths.and_then(FieldFilter::parse);
        let mut out = Map::new();

        for (name, ty) in self.fields() {
            if filter.as_ref().is_some_and(|f| !f.selects(name)) {
                continue;
            }
            let converted = match map.get(name) {
                Some(raw) => {
                    let subpaths = filter.as_ref().and_then(|f| f.subpaths(name));
                    match direction {
                        Direction::Native => ty.to_native_with(raw, subpaths)?,
                        Direction::Primitive => ty.to_primitive_with(raw, subpaths)?,
                    }
                }
                None if !ty.default_value().is_unset() => ty.default_value().clone(),
                None => continue,
            };
            if direction == Direction::Primitive
                && converted.is_null()
                && !self.record_options.export_nones
            {
                continue;
            }
            trace!(record = self.name(), field = name, "converted field");
            out.insert(name.to_string(), converted);
        }
        Ok(out)
    }
}

impl Configurable for Record {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        &RECORD
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            record_options: RecordOptions::from_settings(settings)?,
            core: TypeCore::new(definition, settings)?,
        })
    }
}

impl TypeBuilder<Record> {
    /// Paths applied when a conversion supplies none
    #[must_use]
    pub fn field_filters<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<Value> = paths.into_iter().map(|p| Value::Str(p.into())).collect();
        self.option("field_filters", list)
    }

    /// Keep `Null` fields in primitive output
    #[must_use]
    pub fn export_nones(self, export: bool) -> Self {
        self.option("export_nones", export)
    }
}

impl Type for Record {
    fn core(&self) -> &TypeCore {
        &self.core
    }

    fn convert(&self, value: &Value, direction: Direction, paths: Option<&[FieldPath]>) -> Result<Value> {
        if self.is_falsy(value) {
            return Ok(value.clone());
        }
        let map = value
            .as_map()
            .ok_or_else(|| Error::conversion(format!("Record value is not a mapping: {value}")))?;
        let paths = paths.or(self.record_options.field_filters.as_deref());
        self.convert_fields(map, direction, paths).map(Value::Map)
    }

    /// Fields validate their own raw values, so validators see the mapping
    /// as supplied
    fn native_for_validation(&self, value: &Value) -> Result<Value> {
        if self.is_falsy(value) {
            return self.to_native(value);
        }
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BooleanType, IntegerType, StringType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn song() -> Arc<Definition> {
        Record::define("SongRecord")
            .field("name", StringType::builder().required(true).build().unwrap())
            .field("author", StringType::builder().required(true).build().unwrap())
            .field("track", IntegerType::builder().build().unwrap())
            .build()
    }

    #[test]
    fn fields_iterate_in_declaration_order() {
        let record = Record::builder(&song()).build().unwrap();
        let names: Vec<_> = record.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["name", "author", "track"]);
        assert!(record.field("author").is_some());
        assert!(record.field("lyrics").is_none());
    }

    #[test]
    fn conversion_coerces_fields() {
        let record = Record::builder(&song()).build().unwrap();
        let raw = Value::from(json!({"name": "pride & joy", "track": "3"}));
        assert_eq!(
            record.to_native(&raw).unwrap(),
            Value::from(json!({"name": "pride & joy", "track": 3}))
        );
    }

    #[test]
    fn filter_selects_fields() {
        let record = Record::builder(&song()).build().unwrap();
        let raw = Value::from(json!({"name": "pride & joy", "author": "srv"}));
        let paths = FieldPath::parse_all(&["name"]).unwrap();
        let out = record.to_primitive_with(&raw, Some(&paths)).unwrap();
        assert_eq!(out, Value::from(json!({"name": "pride & joy"})));
    }

    #[test]
    fn configured_filters_apply_by_default() {
        let record = Record::builder(&song())
            .field_filters(["author"])
            .build()
            .unwrap();
        let raw = Value::from(json!({"name": "pride & joy", "author": "srv"}));
        assert_eq!(record.to_native(&raw).unwrap(), Value::from(json!({"author": "srv"})));
        assert!(record.validate(&raw).is_ok());
    }

    #[test]
    fn absent_field_emits_default() {
        let def = Record::define("Flags")
            .field("on", BooleanType::builder().default_value(true).build().unwrap())
            .field("off", BooleanType::builder().build().unwrap())
            .build();
        let record = Record::builder(&def).build().unwrap();
        assert_eq!(
            record.to_native(&Value::from(json!({}))).unwrap(),
            Value::from(json!({"on": true}))
        );
    }

    #[test]
    fn export_nones_controls_primitive_nulls() {
        let def = song();
        let raw = Value::from(json!({"name": "x", "author": null}));

        let dropping = Record::builder(&def).build().unwrap();
        assert_eq!(dropping.to_primitive(&raw).unwrap(), Value::from(json!({"name": "x"})));
        assert_eq!(dropping.to_native(&raw).unwrap(), raw);

        let keeping = Record::builder(&def).export_nones(true).build().unwrap();
        assert_eq!(keeping.to_primitive(&raw).unwrap(), raw);
    }

    #[test]
    fn validate_fields_fails_fast_on_missing_required() {
        let record = Record::builder(&song()).build().unwrap();
        assert!(record.validate(&Value::from(json!({"name": "x", "author": "y"}))).is_ok());
        let err = record.validate(&Value::from(json!({"name": "x"}))).unwrap_err();
        assert!(err.is_validation());
        assert!(record.validate(&Value::Null).is_ok());
    }

    #[test]
    fn non_mapping_is_rejected() {
        let record = Record::builder(&song()).build().unwrap();
        assert!(record.to_native(&"x".into()).unwrap_err().is_conversion());
        assert!(record.validate(&"x".into()).unwrap_err().is_validation());
    }

    #[test]
    fn strict_record_requires_mapping() {
        let record = Record::builder(&song()).strict(true).build().unwrap();
        assert!(record.validate(&Value::List(vec![])).is_err());
    }

    #[test]
    fn unrelated_definition_is_rejected() {
        let def = DefinitionBuilder::new("Loose").extends(&TYPE).build();
        assert!(Record::builder(&def).build().unwrap_err().is_config());
    }
}
