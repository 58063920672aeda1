// Definition registry: storage and lookup for registered definitions

use crate::definition::{Definition, TypeBinding};
use crate::instance::InstanceHolder;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

pub(crate) struct Entry {
    pub definition: Definition,
    pub holder: Box<dyn InstanceHolder>,
}

#[derive(Default)]
struct RegistryInner {
    entries: Vec<Arc<Entry>>,
    by_name: HashMap<String, usize>,
    by_primary: HashMap<TypeId, usize>,
    by_secondary: HashMap<TypeId, usize>,
}

impl RegistryInner {
    fn unindex(&mut self, index: usize) {
        let definition = &self.entries[index].definition;
        match &definition.name {
            Some(name) => {
                self.by_name.remove(name);
            }
            None => {
                self.by_primary.remove(&definition.type_id);
                for binding in &definition.secondary_types {
                    if self.by_secondary.get(&binding.type_id) == Some(&index) {
                        self.by_secondary.remove(&binding.type_id);
                    }
                }
            }
        }
    }

    fn index(&mut self, index: usize) {
        let definition = self.entries[index].definition.clone();
        match &definition.name {
            Some(name) => {
                self.by_name.insert(name.clone(), index);
            }
            None => {
                self.by_primary.insert(definition.type_id, index);
                for binding in &definition.secondary_types {
                    self.by_secondary.insert(binding.type_id, index);
                }
            }
        }
    }
}

/// Stores every registered definition together with its instance holder.
///
/// Unnamed definitions are indexed by their primary type and by each bound
/// secondary type; named definitions are found by name only. Registering a
/// duplicate is an error unless the incoming definition allows override.
#[derive(Default)]
pub struct DefinitionRegistry {
    inner: RwLock<RegistryInner>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn save(
        &self,
        definition: Definition,
        holder: Box<dyn InstanceHolder>,
    ) -> Result<(), crate::Error> {
        let mut inner = self.inner.write().unwrap();

        let existing = match &definition.name {
            Some(name) => inner.by_name.get(name).copied(),
            None => inner.by_primary.get(&definition.type_id).copied(),
        };

        let mut shadowed: Vec<usize> = Vec::new();
        if definition.name.is_none() {
            for binding in &definition.secondary_types {
                for map in [&inner.by_primary, &inner.by_secondary] {
                    if let Some(&index) = map.get(&binding.type_id) {
                        if existing != Some(index) {
                            shadowed.push(index);
                        }
                    }
                }
            }
        }

        if (existing.is_some() || !shadowed.is_empty()) && !definition.options.override_existing {
            return Err(crate::Error::DuplicateDefinition(definition.describe()));
        }

        for index in shadowed {
            warn!(
                definition = %inner.entries[index].definition.describe(),
                replaced_by = %definition.describe(),
                "Secondary type binding shadowed by override"
            );
        }

        let described = definition.describe();
        let entry = Arc::new(Entry { definition, holder });
        let index = match existing {
            Some(index) => {
                inner.unindex(index);
                inner.entries[index] = entry;
                index
            }
            None => {
                inner.entries.push(entry);
                inner.entries.len() - 1
            }
        };
        inner.index(index);

        debug!(definition = %described, "Definition registered");
        Ok(())
    }

    /// Find the entry answering for `type_id`, or for `name` when given.
    /// Returns the secondary binding when the match came through one.
    pub(crate) fn find(
        &self,
        type_id: TypeId,
        name: Option<&str>,
    ) -> Option<(Arc<Entry>, Option<TypeBinding>)> {
        let inner = self.inner.read().unwrap();
        if let Some(name) = name {
            let index = *inner.by_name.get(name)?;
            return Some((inner.entries[index].clone(), None));
        }
        if let Some(&index) = inner.by_primary.get(&type_id) {
            return Some((inner.entries[index].clone(), None));
        }
        if let Some(&index) = inner.by_secondary.get(&type_id) {
            let entry = inner.entries[index].clone();
            let binding = entry
                .definition
                .secondary_types
                .iter()
                .find(|b| b.type_id == type_id)?
                .clone();
            return Some((entry, Some(binding)));
        }
        None
    }

    /// Whether any definition answers for `type_id`
    pub fn contains(&self, type_id: TypeId) -> bool {
        let inner = self.inner.read().unwrap();
        inner.by_primary.contains_key(&type_id) || inner.by_secondary.contains_key(&type_id)
    }

    /// Snapshot of every registered definition, in registration order
    pub fn definitions(&self) -> Vec<Definition> {
        self.inner
            .read()
            .unwrap()
            .entries
            .iter()
            .map(|e| e.definition.clone())
            .collect()
    }

    pub(crate) fn entries(&self) -> Vec<Arc<Entry>> {
        self.inner.read().unwrap().entries.clone()
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().entries.is_empty()
    }

    /// Drop every instance retained for the given scope
    pub fn release_scope(&self, scope_id: &str) {
        for entry in self.entries() {
            entry.holder.release(scope_id);
        }
    }

    /// Drop all retained instances and forget every definition
    pub fn close(&self) {
        let mut inner = self.inner.write().unwrap();
        for entry in &inner.entries {
            entry.holder.close();
        }
        let count = inner.entries.len();
        inner.entries.clear();
        inner.by_name.clear();
        inner.by_primary.clear();
        inner.by_secondary.clear();
        debug!(definition_count = count, "Definition registry closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::SingleInstance;
    use crate::{factory, single};

    struct Widget;
    struct Gadget;

    trait Part: Send + Sync {}
    impl Part for Widget {}

    fn save(registry: &DefinitionRegistry, definition: Definition) -> Result<(), crate::Error> {
        registry.save(definition, Box::new(SingleInstance::new()))
    }

    #[test]
    fn test_save_and_find_by_type() {
        let registry = DefinitionRegistry::new();
        save(&registry, single(|_| Ok(Widget)).build()).unwrap();

        let (entry, binding) = registry.find(TypeId::of::<Widget>(), None).unwrap();
        assert_eq!(entry.definition.type_id, TypeId::of::<Widget>());
        assert!(binding.is_none());
        assert!(registry.contains(TypeId::of::<Widget>()));
        assert!(!registry.contains(TypeId::of::<Gadget>()));
    }

    #[test]
    fn test_duplicate_rejected_without_override() {
        let registry = DefinitionRegistry::new();
        save(&registry, single(|_| Ok(Widget)).build()).unwrap();
        let err = save(&registry, single(|_| Ok(Widget)).build()).unwrap_err();
        assert!(matches!(err, crate::Error::DuplicateDefinition(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_override_replaces_entry() {
        let registry = DefinitionRegistry::new();
        save(&registry, single(|_| Ok(Widget)).build()).unwrap();
        save(&registry, factory(|_| Ok(Widget)).allow_override().build()).unwrap();

        assert_eq!(registry.len(), 1);
        let (entry, _) = registry.find(TypeId::of::<Widget>(), None).unwrap();
        assert_eq!(entry.definition.kind, crate::DefinitionKind::Factory);
    }

    #[test]
    fn test_named_definitions_coexist_with_unnamed() {
        let registry = DefinitionRegistry::new();
        save(&registry, single(|_| Ok(Widget)).build()).unwrap();
        save(&registry, single(|_| Ok(Widget)).named("spare").build()).unwrap();

        assert_eq!(registry.len(), 2);
        let (by_name, _) = registry.find(TypeId::of::<Widget>(), Some("spare")).unwrap();
        assert_eq!(by_name.definition.name.as_deref(), Some("spare"));
        assert!(registry.find(TypeId::of::<Widget>(), Some("missing")).is_none());
    }

    #[test]
    fn test_find_through_secondary_type() {
        let registry = DefinitionRegistry::new();
        save(&registry, single(|_| Ok(Widget)).bind::<dyn Part>(|w| w).build()).unwrap();

        let (entry, binding) = registry.find(TypeId::of::<dyn Part>(), None).unwrap();
        assert_eq!(entry.definition.type_id, TypeId::of::<Widget>());
        assert!(binding.is_some());
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let registry = DefinitionRegistry::new();
        save(&registry, single(|_| Ok(Widget)).build()).unwrap();
        save(&registry, single(|_| Ok(Gadget)).build()).unwrap();

        let snapshot = registry.definitions();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].type_id, TypeId::of::<Widget>());
        assert_eq!(snapshot[1].type_id, TypeId::of::<Gadget>());
    }

    #[test]
    fn test_close_clears_everything() {
        let registry = DefinitionRegistry::new();
        save(&registry, single(|_| Ok(Widget)).build()).unwrap();
        registry.close();
        assert!(registry.is_empty());
        assert!(registry.find(TypeId::of::<Widget>(), None).is_none());
    }
}
