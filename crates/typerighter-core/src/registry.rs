//! Registry of named type definitions
//!
//! Provides [`TypeRegistry`], a name-keyed store of composed definitions for
//! tooling that needs to find types declared across several crates. The
//! first definition registered becomes the base; later registrations must
//! descend from it.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::definition::Definition;
use crate::error::{Error, Result};
use crate::types;

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::with_builtins);

#[derive(Debug, Default)]
struct Entries {
    base: Option<Arc<Definition>>,
    by_name: IndexMap<String, Arc<Definition>>,
}

/// Thread-safe definition registry
///
/// Reads run concurrently; registrations are serialized by a write lock.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: RwLock<Entries>,
}

impl TypeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry holding the built-in definitions, `Type` first
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        let builtins = [
            &*types::TYPE,
            &*types::PRIMITIVE,
            &*types::BOOLEAN,
            &*types::STRING,
            &*types::NUMBER,
            &*types::INTEGER,
            &*types::FLOAT,
            &*types::SUM,
            &*types::CONTAINER,
            &*types::LIST,
            &*types::RECORD,
        ];
        for definition in builtins {
            registry.insert(Arc::clone(definition));
        }
        registry
    }

    /// The process-wide registry, pre-loaded with the built-ins
    #[must_use]
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// Add a definition under its name, replacing any previous entry
    ///
    /// # Errors
    /// Returns [`Error::Uncachable`] when the definition does not descend
    /// from the base definition
    pub fn register(&self, definition: Arc<Definition>) -> Result<()> {
        let mut entries = self.entries.write();
        if let Some(base) = &entries.base {
            if !definition.is_subtype_of(base) {
                return Err(Error::Uncachable(definition.name().to_string()));
            }
        }
        Self::insert_locked(&mut entries, definition);
        Ok(())
    }

    fn insert(&self, definition: Arc<Definition>) {
        Self::insert_locked(&mut self.entries.write(), definition);
    }

    fn insert_locked(entries: &mut Entries, definition: Arc<Definition>) {
        if entries.base.is_none() {
            entries.base = Some(Arc::clone(&definition));
        }
        debug!(definition = %definition.name(), "registered type definition");
        entries
            .by_name
            .insert(definition.name().to_string(), definition);
    }

    /// Look up a definition by name
    ///
    /// # Errors
    /// Returns [`Error::CacheMiss`] when the name is not registered
    pub fn get(&self, name: &str) -> Result<Arc<Definition>> {
        self.entries
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CacheMiss(name.to_string()))
    }

    /// Check if a name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().by_name.contains_key(name)
    }

    /// The base definition, once anything is registered
    #[must_use]
    pub fn base(&self) -> Option<Arc<Definition>> {
        self.entries.read().base.clone()
    }

    /// Registered names in registration order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().by_name.keys().cloned().collect()
    }

    /// Registered name/definition pairs in registration order
    #[must_use]
    pub fn items(&self) -> Vec<(String, Arc<Definition>)> {
        self.entries
            .read()
            .by_name
            .iter()
            .map(|(name, def)| (name.clone(), Arc::clone(def)))
            .collect()
    }

    /// Get number of registered definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().by_name.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DefinitionBuilder;
    use crate::types::{Configurable, Record};

    #[test]
    fn builtins_start_with_type() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.keys()[0], "Type");
        assert_eq!(registry.base().unwrap().name(), "Type");
        assert!(registry.contains("Record"));
        assert!(registry.contains("ListType"));
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn register_and_get() {
        let registry = TypeRegistry::with_builtins();
        let song = Record::define("SongType").register(&registry).unwrap();
        let found = registry.get("SongType").unwrap();
        assert!(Arc::ptr_eq(&song, &found));
        assert_eq!(registry.items().last().unwrap().0, "SongType");
    }

    #[test]
    fn miss_is_registry_error() {
        let registry = TypeRegistry::with_builtins();
        let err = registry.get("NopeType").unwrap_err();
        assert!(matches!(err, Error::CacheMiss(ref name) if name == "NopeType"));
    }

    #[test]
    fn rejects_unrelated_definition() {
        let registry = TypeRegistry::with_builtins();
        let stray = DefinitionBuilder::new("Stray").build();
        let err = registry.register(stray).unwrap_err();
        assert!(matches!(err, Error::Uncachable(_)));
        assert!(!registry.contains("Stray"));
    }

    #[test]
    fn first_registration_becomes_base() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        let root = DefinitionBuilder::new("Root").build();
        registry.register(Arc::clone(&root)).unwrap();
        assert!(Arc::ptr_eq(&registry.base().unwrap(), &root));
        assert!(registry
            .register(Arc::clone(Record::base_definition()))
            .is_err());
    }

    #[test]
    fn concurrent_first_registrations_admit_one_base() {
        let registry = TypeRegistry::new();
        let roots: Vec<_> = (0..8)
            .map(|i| DefinitionBuilder::new(format!("Root{i}")).build())
            .collect();

        let admitted = std::thread::scope(|scope| {
            let handles: Vec<_> = roots
                .iter()
                .map(|root| scope.spawn(|| registry.register(Arc::clone(root)).is_ok()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join())
                .filter(|r| matches!(r, Ok(true)))
                .count()
        });

        assert_eq!(admitted, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(TypeRegistry::global(), TypeRegistry::global()));
        assert!(TypeRegistry::global().contains("StringType"));
    }
}
