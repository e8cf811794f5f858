//! Declared configuration options and schematic export
//!
//! Every [`Definition`](crate::Definition) carries a [`Declaration`]: the
//! options it recognizes with their static defaults, plus presets the
//! definition assigns itself. Building a type resolves explicit options over
//! both into [`Settings`], and the resolved map is kept as the
//! "as constructed" record that [`Schematic`] exports.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::value::Value;

/// Option declarations for one definition
#[derive(Debug, Default)]
pub struct Declaration {
    defaults: IndexMap<String, Value>,
    presets: IndexMap<String, Value>,
    last_constructed: Mutex<Option<IndexMap<String, Value>>>,
}

impl Declaration {
    /// Aggregate declarations from ancestors, then apply own entries
    ///
    /// Ancestors are applied last-listed first, so the first-listed ancestor
    /// wins a name collision. Own entries override in place.
    pub(crate) fn compose(
        parents: &[&Declaration],
        own_defaults: Vec<(String, Value)>,
        own_presets: Vec<(String, Value)>,
    ) -> Self {
        let mut defaults = IndexMap::new();
        let mut presets = IndexMap::new();
        for parent in parents.iter().rev() {
            defaults.extend(parent.defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
            presets.extend(parent.presets.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        defaults.extend(own_defaults);
        presets.extend(own_presets);

        Self {
            defaults,
            presets,
            last_constructed: Mutex::new(None),
        }
    }

    /// Recognized option names with their static defaults
    #[inline]
    #[must_use]
    pub fn defaults(&self) -> &IndexMap<String, Value> {
        &self.defaults
    }

    /// Option values the definition assigns at construction
    #[inline]
    #[must_use]
    pub fn presets(&self) -> &IndexMap<String, Value> {
        &self.presets
    }

    /// Check if an option name is recognized
    #[inline]
    #[must_use]
    pub fn recognizes(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
    }

    /// Options resolved by the most recent construction of this definition
    #[must_use]
    pub fn last_constructed(&self) -> Option<IndexMap<String, Value>> {
        self.last_constructed.lock().clone()
    }

    /// Resolve explicit options over presets over defaults
    ///
    /// Nothing is captured until [`capture`](Self::capture) is called.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an option name the definition does not
    /// declare
    pub fn resolve(&self, explicit: &IndexMap<String, Value>) -> Result<Settings> {
        if let Some(unknown) = explicit.keys().find(|k| !self.recognizes(k)) {
            return Err(Error::config(format!("unrecognized option: {unknown}")));
        }

        let mut values = self.defaults.clone();
        for (name, value) in self.presets.iter().chain(explicit) {
            values.insert(name.clone(), value.clone());
        }

        Ok(Settings { values })
    }

    /// Record the options of a construction that succeeded
    pub fn capture(&self, settings: &Settings) {
        *self.last_constructed.lock() = Some(settings.values.clone());
    }
}

/// Resolved options for one construction, with typed readers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: IndexMap<String, Value>,
}

impl Settings {
    /// All resolved options in declaration order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Raw option value, `Unset` when not declared
    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        static UNSET: Value = Value::Unset;
        self.values.get(name).unwrap_or(&UNSET)
    }

    /// Read a boolean option; absent reads as `false`
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a non-boolean value
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            Value::Bool(b) => Ok(*b),
            v if v.is_absent() => Ok(false),
            other => Err(invalid(name, "a boolean", other)),
        }
    }

    /// Read a non-negative count option
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a negative or non-integer value
    pub fn count(&self, name: &str) -> Result<Option<usize>> {
        match self.get(name) {
            Value::Int(i) => usize::try_from(*i)
                .map(Some)
                .map_err(|_| invalid(name, "a non-negative integer", &Value::Int(*i))),
            v if v.is_absent() => Ok(None),
            other => Err(invalid(name, "a non-negative integer", other)),
        }
    }

    /// Read a numeric option
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a non-numeric value
    pub fn number(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name) {
            v if v.is_absent() => Ok(None),
            v => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| invalid(name, "a number", v)),
        }
    }

    /// Read a text option
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a non-text value
    pub fn text(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            Value::Str(s) => Ok(Some(s.clone())),
            v if v.is_absent() => Ok(None),
            other => Err(invalid(name, "a string", other)),
        }
    }

    /// Read a list option
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a non-list value
    pub fn list(&self, name: &str) -> Result<Option<Vec<Value>>> {
        match self.get(name) {
            Value::List(items) => Ok(Some(items.clone())),
            v if v.is_absent() => Ok(None),
            other => Err(invalid(name, "a list", other)),
        }
    }
}

fn invalid(name: &str, expected: &str, actual: &Value) -> Error {
    Error::config(format!(
        "option '{name}' must be {expected}, got {}: {actual}",
        actual.kind()
    ))
}

/// Exported description of a live type
///
/// Serializes as the pair `[type-name, payload]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
    /// Definition name
    pub name: String,
    /// Options or variant descriptions
    pub payload: SchematicPayload,
}

/// Schematic payload
#[derive(Debug, Clone, PartialEq)]
pub enum SchematicPayload {
    /// The "as constructed" options of a leaf or record type
    Options(IndexMap<String, Value>),
    /// One schematic per sum-type variant, in declaration order
    Variants(Vec<Schematic>),
    /// Container options plus the element type, rendered under `type`
    Container {
        /// The "as constructed" options of the container
        options: IndexMap<String, Value>,
        /// Element type description
        element: Box<Schematic>,
    },
}

impl Schematic {
    /// Describe a type by its constructed options
    #[inline]
    #[must_use]
    pub fn options(name: impl Into<String>, options: IndexMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            payload: SchematicPayload::Options(options),
        }
    }

    /// Describe a sum type by its variants
    #[inline]
    #[must_use]
    pub fn variants(name: impl Into<String>, variants: Vec<Schematic>) -> Self {
        Self {
            name: name.into(),
            payload: SchematicPayload::Variants(variants),
        }
    }

    /// Describe a container by its options and element type
    #[inline]
    #[must_use]
    pub fn container(
        name: impl Into<String>,
        options: IndexMap<String, Value>,
        element: Schematic,
    ) -> Self {
        Self {
            name: name.into(),
            payload: SchematicPayload::Container {
                options,
                element: Box::new(element),
            },
        }
    }

    /// Render as order-preserving JSON, omitting `Unset` options
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let payload = match &self.payload {
            SchematicPayload::Options(options) => JsonValue::Object(options_json(options)),
            SchematicPayload::Variants(variants) => {
                JsonValue::Array(variants.iter().map(Self::to_json).collect())
            }
            SchematicPayload::Container { options, element } => {
                let mut object = options_json(options);
                object.insert("type".to_string(), element.to_json());
                JsonValue::Object(object)
            }
        };
        JsonValue::Array(vec![JsonValue::String(self.name.clone()), payload])
    }

    /// Content hash of the key-sorted JSON form
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let canonical = canonical_json(&self.to_json());
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}

impl Serialize for Schematic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn options_json(options: &IndexMap<String, Value>) -> serde_json::Map<String, JsonValue> {
    options
        .iter()
        .filter(|(_, v)| !v.is_unset())
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

/// JSON with object keys sorted at every level
fn canonical_json(value: &JsonValue) -> String {
    fn sort(value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Object(map) => {
                let sorted: BTreeMap<_, _> = map.iter().map(|(k, v)| (k.clone(), sort(v))).collect();
                JsonValue::Object(sorted.into_iter().collect())
            }
            JsonValue::Array(items) => JsonValue::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    sort(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    fn base() -> Declaration {
        Declaration::compose(
            &[],
            entries(&[
                ("default", Value::Unset),
                ("required", Value::Bool(false)),
                ("strict", Value::Bool(false)),
            ]),
            Vec::new(),
        )
    }

    #[test]
    fn compose_keeps_ancestor_order() {
        let parent = base();
        let child = Declaration::compose(
            &[&parent],
            entries(&[("choices", Value::Null), ("required", Value::Bool(true))]),
            Vec::new(),
        );
        let names: Vec<_> = child.defaults().keys().map(String::as_str).collect();
        assert_eq!(names, ["default", "required", "strict", "choices"]);
        assert_eq!(child.defaults()["required"], Value::Bool(true));
    }

    #[test]
    fn first_listed_parent_preset_wins() {
        let a = Declaration::compose(&[&base()], Vec::new(), entries(&[("default", "A".into())]));
        let b = Declaration::compose(&[&base()], Vec::new(), entries(&[("default", "B".into())]));
        let sub = Declaration::compose(&[&a, &b], Vec::new(), Vec::new());
        assert_eq!(sub.presets()["default"], Value::from("A"));
    }

    #[test]
    fn resolve_layers_then_capture() {
        let decl = Declaration::compose(&[&base()], Vec::new(), entries(&[("required", true.into())]));
        assert!(decl.last_constructed().is_none());

        let mut explicit = IndexMap::new();
        explicit.insert("strict".to_string(), Value::Bool(true));
        let settings = decl.resolve(&explicit).unwrap();

        assert!(settings.flag("required").unwrap());
        assert!(settings.flag("strict").unwrap());
        assert_eq!(settings.get("default"), &Value::Unset);
        assert!(decl.last_constructed().is_none());

        decl.capture(&settings);
        assert_eq!(decl.last_constructed().unwrap()["strict"], Value::Bool(true));
        assert_eq!(decl.defaults()["strict"], Value::Bool(false));
    }

    #[test]
    fn resolve_rejects_unknown_option() {
        let mut explicit = IndexMap::new();
        explicit.insert("colour".to_string(), Value::from("red"));
        let err = base().resolve(&explicit).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn typed_readers() {
        let decl = Declaration::compose(
            &[],
            entries(&[
                ("min_length", Value::Int(3)),
                ("max", Value::Float(2.5)),
                ("regex", Value::from("^a")),
                ("bad", Value::Int(-1)),
            ]),
            Vec::new(),
        );
        let settings = decl.resolve(&IndexMap::new()).unwrap();
        assert_eq!(settings.count("min_length").unwrap(), Some(3));
        assert_eq!(settings.number("max").unwrap(), Some(2.5));
        assert_eq!(settings.text("regex").unwrap().as_deref(), Some("^a"));
        assert!(settings.count("bad").is_err());
        assert_eq!(settings.count("missing").unwrap(), None);
    }

    #[test]
    fn schematic_json_pair() {
        let mut options = IndexMap::new();
        options.insert("required".to_string(), Value::Bool(true));
        let leaf = Schematic::options("StringType", options);
        let sum = Schematic::variants("SumType", vec![leaf.clone()]);

        assert_eq!(leaf.to_json(), json!(["StringType", {"required": true}]));
        assert_eq!(sum.to_json(), json!(["SumType", [["StringType", {"required": true}]]]));
        assert_eq!(serde_json::to_value(&sum).unwrap(), sum.to_json());
    }

    #[test]
    fn fingerprint_ignores_key_order() {
        let mut ab = IndexMap::new();
        ab.insert("a".to_string(), Value::Int(1));
        ab.insert("b".to_string(), Value::Int(2));
        let mut ba = IndexMap::new();
        ba.insert("b".to_string(), Value::Int(2));
        ba.insert("a".to_string(), Value::Int(1));

        let x = Schematic::options("T", ab);
        let y = Schematic::options("T", ba);
        assert_eq!(x.fingerprint(), y.fingerprint());
        assert_eq!(x.fingerprint().len(), 64);
    }
}
