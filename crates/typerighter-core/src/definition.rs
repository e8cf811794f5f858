//! Type definitions and their composition
//!
//! A [`Definition`] is the shared, immutable description of a kind of type:
//! its native representation, ordered validators, declared fields, field
//! functions, and option declarations. Definitions are built once with
//! [`DefinitionBuilder`] and shared through `Arc` by every instance.
//!
//! # Composition
//!
//! Each ordered collection is aggregated from the parent definitions
//! (last-listed parent first, so the first-listed parent wins a name clash),
//! then the definition's own entries are applied in source order. An own
//! entry that reuses an inherited name replaces it in place and keeps the
//! inherited position.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::declaration::Declaration;
use crate::error::Result;
use crate::registry::TypeRegistry;
use crate::types::Type;
use crate::value::{Native, Value};
use crate::view::View;

/// Named validation rule run against a converted value
pub type Validator = Arc<dyn Fn(&dyn Type, &Value) -> Result<()> + Send + Sync>;

/// Derived value computed from a record view
pub type FieldFunction = Arc<dyn Fn(&View<'_>) -> Result<Value> + Send + Sync>;

/// Shared description of a kind of type
pub struct Definition {
    name: String,
    native: Native,
    parents: Vec<Arc<Definition>>,
    validators: IndexMap<String, Validator>,
    fields: IndexMap<String, Arc<dyn Type>>,
    field_functions: IndexMap<String, FieldFunction>,
    declaration: Declaration,
}

impl Definition {
    /// Type name used in schematics and registries
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native representation
    #[inline]
    #[must_use]
    pub fn native(&self) -> Native {
        self.native
    }

    /// Direct parents, in declaration order
    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[Arc<Definition>] {
        &self.parents
    }

    /// Composed validators in run order
    #[inline]
    #[must_use]
    pub fn validators(&self) -> &IndexMap<String, Validator> {
        &self.validators
    }

    /// Composed record fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &IndexMap<String, Arc<dyn Type>> {
        &self.fields
    }

    /// Look up a single field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<dyn Type>> {
        self.fields.get(name)
    }

    /// Composed field functions
    #[inline]
    #[must_use]
    pub fn field_functions(&self) -> &IndexMap<String, FieldFunction> {
        &self.field_functions
    }

    /// Option declarations and presets
    #[inline]
    #[must_use]
    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    /// Check if this definition is `other` or descends from it
    #[must_use]
    pub fn is_subtype_of(&self, other: &Definition) -> bool {
        std::ptr::eq(self, other) || self.parents.iter().any(|p| p.is_subtype_of(other))
    }

    /// Definition names from this one up to the root, depth first
    #[must_use]
    pub fn lineage(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        for parent in &self.parents {
            for name in parent.lineage() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("native", &self.native)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field(
                "field_functions",
                &self.field_functions.keys().collect::<Vec<_>>(),
            )
            .field("options", &self.declaration.defaults())
            .finish()
    }
}

/// Builder for [`Definition`]
///
/// ```ignore
/// let artist = DefinitionBuilder::new("ArtistRecord")
///     .extends(Record::definition())
///     .field("name", StringType::builder().required(true).build()?)
///     .build();
/// ```
pub struct DefinitionBuilder {
    name: String,
    native: Option<Native>,
    parents: Vec<Arc<Definition>>,
    validators: Vec<(String, Validator)>,
    fields: Vec<(String, Arc<dyn Type>)>,
    field_functions: Vec<(String, FieldFunction)>,
    options: Vec<(String, Value)>,
    presets: Vec<(String, Value)>,
}

impl DefinitionBuilder {
    /// Start a definition with no parents
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native: None,
            parents: Vec::new(),
            validators: Vec::new(),
            fields: Vec::new(),
            field_functions: Vec::new(),
            options: Vec::new(),
            presets: Vec::new(),
        }
    }

    /// Add a parent definition
    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: &Arc<Definition>) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    /// Set the native representation; inherited from the first parent otherwise
    #[inline]
    #[must_use]
    pub fn native(mut self, native: Native) -> Self {
        self.native = Some(native);
        self
    }

    /// Declare a validator
    #[must_use]
    pub fn validator<F>(mut self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&dyn Type, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.validators.push((name.into(), Arc::new(validator)));
        self
    }

    /// Declare a field
    #[must_use]
    pub fn field(self, name: impl Into<String>, ty: impl Type + 'static) -> Self {
        self.shared_field(name, Arc::new(ty))
    }

    /// Declare a field with an already shared type
    #[inline]
    #[must_use]
    pub fn shared_field(mut self, name: impl Into<String>, ty: Arc<dyn Type>) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    /// Declare a field function
    #[must_use]
    pub fn field_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&View<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.field_functions.push((name.into(), Arc::new(function)));
        self
    }

    /// Declare a recognized option with its static default
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.options.push((name.into(), default.into()));
        self
    }

    /// Assign an option value for every instance of this definition
    #[must_use]
    pub fn preset(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.presets.push((name.into(), value.into()));
        self
    }

    /// Compose and freeze the definition
    #[must_use]
    pub fn build(self) -> Arc<Definition> {
        let native = self
            .native
            .or_else(|| self.parents.first().map(|p| p.native()))
            .unwrap_or(Native::Identity);

        let validators = compose(
            self.parents.iter().map(|p| &p.validators),
            self.validators,
        );
        let fields = compose(self.parents.iter().map(|p| &p.fields), self.fields);
        let field_functions = compose(
            self.parents.iter().map(|p| &p.field_functions),
            self.field_functions,
        );
        let parent_decls: Vec<&Declaration> = self.parents.iter().map(|p| &p.declaration).collect();
        let declaration = Declaration::compose(&parent_decls, self.options, self.presets);

        debug!(
            definition = %self.name,
            native = native.name(),
            validators = validators.len(),
            fields = fields.len(),
            "composed type definition"
        );

        Arc::new(Definition {
            name: self.name,
            native,
            parents: self.parents,
            validators,
            fields,
            field_functions,
            declaration,
        })
    }

    /// Compose the definition and add it to a registry
    ///
    /// # Errors
    /// Returns [`Error::Uncachable`](crate::Error::Uncachable) when the
    /// definition does not descend from the registry's base type
    pub fn register(self, registry: &TypeRegistry) -> Result<Arc<Definition>> {
        let definition = self.build();
        registry.register(Arc::clone(&definition))?;
        Ok(definition)
    }
}

/// Merge inherited ordered maps, then apply own entries in place
fn compose<'a, T, I>(inherited: I, own: Vec<(String, T)>) -> IndexMap<String, T>
where
    T: Clone + 'a,
    I: DoubleEndedIterator<Item = &'a IndexMap<String, T>>,
{
    let mut merged = IndexMap::new();
    for parent in inherited.rev() {
        for (name, entry) in parent {
            merged.insert(name.clone(), entry.clone());
        }
    }
    for (name, entry) in own {
        merged.insert(name, entry);
    }
    merged
}
