//! Record views
//!
//! A [`View`] pairs one [`Record`] with one data mapping. Field access reads
//! and writes the mapping directly; record-typed fields are bound eagerly as
//! nested views. Anything else on the record (conversion, validation) is
//! reachable through `Deref`.

use std::ops::Deref;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::types::{downcast, Record, Type};
use crate::value::{Map, Value};

static NULL: Value = Value::Null;

/// How data is prepared when a view is bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Run the record's native conversion first
    #[default]
    Native,
    /// Run the record's primitive conversion first
    Primitive,
    /// Bind the data unmodified
    Raw,
}

#[derive(Debug)]
enum Slot<'r> {
    Value(Value),
    Nested(View<'r>),
}

/// Read/write façade over a record and its data
#[derive(Debug)]
pub struct View<'r> {
    record: &'r Record,
    slots: IndexMap<String, Slot<'r>>,
}

impl<'r> View<'r> {
    /// Bind data to a record
    ///
    /// # Errors
    /// Returns conversion errors from `mode`, or [`Error::Conversion`] when
    /// the data is not a mapping
    pub fn new(record: &'r Record, data: &Value, mode: ViewMode) -> Result<Self> {
        let prepared = match mode {
            ViewMode::Native => record.to_native(data)?,
            ViewMode::Primitive => record.to_primitive(data)?,
            ViewMode::Raw => data.clone(),
        };
        Self::bind(record, into_map(prepared)?)
    }

    fn bind(record: &'r Record, data: Map) -> Result<Self> {
        let mut slots = IndexMap::new();
        for (name, value) in data {
            let slot = match nested_record(record, &name) {
                Some(nested) => Slot::Nested(Self::bind(nested, into_map(value)?)?),
                None => Slot::Value(value),
            };
            slots.insert(name, slot);
        }
        for (name, _) in record.fields() {
            if slots.contains_key(name) {
                continue;
            }
            if let Some(nested) = nested_record(record, name) {
                slots.insert(name.to_string(), Slot::Nested(Self::bind(nested, Map::new())?));
            }
        }
        Ok(Self { record, slots })
    }

    /// The record this view is shaped by
    #[inline]
    #[must_use]
    pub fn record(&self) -> &'r Record {
        self.record
    }

    fn declared(&self, name: &str) -> Result<()> {
        if self.record.field(name).is_some() {
            Ok(())
        } else {
            Err(Error::UnknownField(name.to_string()))
        }
    }

    /// Read a scalar field; unsupplied fields read as `Null`
    ///
    /// # Errors
    /// Returns [`Error::UnknownField`] for an undeclared name and
    /// [`Error::NestedField`] for a record-typed field
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.declared(name)?;
        match self.slots.get(name) {
            Some(Slot::Value(value)) => Ok(value),
            Some(Slot::Nested(_)) => Err(Error::NestedField(name.to_string())),
            None => Ok(&NULL),
        }
    }

    /// Write a field into the bound mapping
    ///
    /// Writing a record-typed field rebinds its nested view to the new
    /// mapping.
    ///
    /// # Errors
    /// Returns [`Error::UnknownField`] for an undeclared name, or
    /// [`Error::Conversion`] when a record-typed field gets a non-mapping
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.declared(name)?;
        let value = value.into();
        let slot = match nested_record(self.record, name) {
            Some(nested) => Slot::Nested(Self::bind(nested, into_map(value)?)?),
            None => Slot::Value(value),
        };
        self.slots.insert(name.to_string(), slot);
        Ok(())
    }

    /// Remove a field from the mapping, returning its previous value
    ///
    /// A record-typed field is reset to an empty nested view.
    ///
    /// # Errors
    /// Returns [`Error::UnknownField`] for an undeclared name
    pub fn remove(&mut self, name: &str) -> Result<Option<Value>> {
        self.declared(name)?;
        if let Some(nested) = nested_record(self.record, name) {
            let empty = Slot::Nested(Self::bind(nested, Map::new())?);
            return Ok(self.slots.insert(name.to_string(), empty).map(Slot::into_value));
        }
        Ok(self.slots.shift_remove(name).map(Slot::into_value))
    }

    /// Nested view of a record-typed field
    #[must_use]
    pub fn nested(&self, name: &str) -> Option<&View<'r>> {
        match self.slots.get(name) {
            Some(Slot::Nested(view)) => Some(view),
            _ => None,
        }
    }

    /// Mutable nested view of a record-typed field
    pub fn nested_mut(&mut self, name: &str) -> Option<&mut View<'r>> {
        match self.slots.get_mut(name) {
            Some(Slot::Nested(view)) => Some(view),
            _ => None,
        }
    }

    /// Field/value pairs present in the mapping, skipping `Unset`
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, Value)> {
        self.slots
            .iter()
            .map(|(name, slot)| (name.as_str(), slot.to_value()))
            .filter(|(_, value)| !value.is_unset())
            .collect()
    }

    /// Current data as a mapping
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.slots
                .iter()
                .map(|(name, slot)| (name.clone(), slot.to_value()))
                .collect(),
        )
    }

    /// Consume the view, returning its data
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Map(
            self.slots
                .into_iter()
                .map(|(name, slot)| (name, slot.into_value()))
                .collect(),
        )
    }

    /// Convert the current data to native form
    ///
    /// # Errors
    /// See [`Type::convert`]
    pub fn to_native(&self) -> Result<Value> {
        self.record.to_native(&self.to_value())
    }

    /// Convert the current data to native form, restricted to paths
    ///
    /// # Errors
    /// See [`Type::convert`]
    pub fn to_native_with(&self, paths: &[FieldPath]) -> Result<Value> {
        self.record.to_native_with(&self.to_value(), Some(paths))
    }

    /// Convert the current data to primitive form
    ///
    /// # Errors
    /// See [`Type::convert`]
    pub fn to_primitive(&self) -> Result<Value> {
        self.record.to_primitive(&self.to_value())
    }

    /// Convert the current data to primitive form, restricted to paths
    ///
    /// # Errors
    /// See [`Type::convert`]
    pub fn to_primitive_with(&self, paths: &[FieldPath]) -> Result<Value> {
        self.record.to_primitive_with(&self.to_value(), Some(paths))
    }

    /// Validate the current data against the record
    ///
    /// # Errors
    /// See [`Type::validate`]
    pub fn validate(&self) -> Result<()> {
        self.record.validate(&self.to_value())
    }

    /// Run a field function of the record against this view
    ///
    /// # Errors
    /// Returns [`Error::UnknownField`] when no such function is declared,
    /// or whatever the function returns
    pub fn call(&self, function: &str) -> Result<Value> {
        let f = self
            .record
            .definition()
            .field_functions()
            .get(function)
            .ok_or_else(|| Error::UnknownField(function.to_string()))?;
        f(self)
    }

    /// Names of the record's field functions
    #[must_use]
    pub fn functions(&self) -> Vec<&'r str> {
        self.record
            .definition()
            .field_functions()
            .keys()
            .map(String::as_str)
            .collect()
    }
}

impl<'r> Slot<'r> {
    fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Nested(view) => view.to_value(),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Nested(view) => view.into_value(),
        }
    }
}

impl Deref for View<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        self.record
    }
}

fn nested_record<'r>(record: &'r Record, name: &str) -> Option<&'r Record> {
    record.field(name).and_then(|ty| downcast::<Record>(ty.as_ref()))
}

fn into_map(value: Value) -> Result<Map> {
    match value {
        Value::Map(map) => Ok(map),
        v if v.is_absent() => Ok(Map::new()),
        other => Err(Error::conversion(format!("View data is not a mapping: {other}"))),
    }
}
