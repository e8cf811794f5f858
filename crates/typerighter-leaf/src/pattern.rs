//! Generic pattern-checked string type
//!
//! A [`PatternKind`] names a leaf type and the pattern its values must match.
//! [`PatternType<K>`] is the string type configured with that pattern as its
//! preset `regex` option, so every kind shares string coercion, length bounds
//! and schematic export.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use typerighter_core::types::{
    string_convert, string_core, string_is_falsy, LengthOptions, PatternOptions,
};
use typerighter_core::{
    Configurable, Definition, DefinitionBuilder, Direction, FieldPath, Result, Settings,
    StringType, Type, TypeBuilder, TypeCore, Value,
};

/// A named leaf pattern
///
/// # Implementation Requirements
///
/// - `NAME` must be unique among registered definitions
/// - `definition()` must return the same definition on every call
pub trait PatternKind: Debug + Send + Sync + 'static {
    /// Type name
    const NAME: &'static str;

    /// Pattern values must match in full
    fn pattern() -> &'static str;

    /// Shared definition for this kind
    fn definition() -> &'static Arc<Definition>;
}

/// Start a definition extending the string type with `K`'s pattern preset
#[must_use]
pub fn pattern_definition<K: PatternKind>() -> DefinitionBuilder {
    DefinitionBuilder::new(K::NAME)
        .extends(StringType::base_definition())
        .preset("regex", K::pattern())
}

/// String type restricted to a [`PatternKind`]
#[derive(Debug, Clone)]
pub struct PatternType<K: PatternKind> {
    core: TypeCore,
    _kind: PhantomData<fn() -> K>,
}

impl<K: PatternKind> PatternType<K> {
    /// Start a builder
    #[must_use]
    pub fn builder() -> TypeBuilder<Self> {
        TypeBuilder::new()
    }
}

impl<K: PatternKind> Configurable for PatternType<K> {
    type Params = ();

    fn base_definition() -> &'static Arc<Definition> {
        K::definition()
    }

    fn construct(definition: Arc<Definition>, settings: &Settings, (): ()) -> Result<Self> {
        Ok(Self {
            core: string_core(definition, settings)?,
            _kind: PhantomData,
        })
    }
}

impl<K: PatternKind> LengthOptions for PatternType<K> {}
impl<K: PatternKind> PatternOptions for PatternType<K> {}

impl<K: PatternKind> Type for PatternType<K> {
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
