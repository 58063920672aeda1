// Instance holders: per-definition caching strategies behind a common seam

use crate::container::Context;
use crate::definition::{AnyInstance, Definition};
use crate::Error;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::trace;

/// Backing store of a registered definition.
///
/// The container asks the holder for an instance on every resolution; the
/// holder decides whether to call the definition's factory or hand back a
/// retained value. Swapping the holder changes how a definition behaves
/// without touching the definition itself.
pub trait InstanceHolder: Send + Sync {
    /// Produce or retrieve the instance for `definition`
    fn get(&self, definition: &Definition, ctx: &Context<'_>) -> Result<AnyInstance, Error>;

    /// Whether an instance has been created, for the given scope when relevant
    fn is_created(&self, scope_id: Option<&str>) -> bool;

    /// Drop the instance retained for a scope
    fn release(&self, scope_id: &str);

    /// Drop everything the holder retains
    fn close(&self);
}

/// Holder for `single` definitions: one lazily created, shared instance
#[derive(Default)]
pub struct SingleInstance {
    value: RwLock<Option<AnyInstance>>,
}

impl SingleInstance {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstanceHolder for SingleInstance {
    fn get(&self, definition: &Definition, ctx: &Context<'_>) -> Result<AnyInstance, Error> {
        if let Some(value) = self.value.read().unwrap().as_ref() {
            return Ok(value.clone());
        }
        let created = definition.create(ctx)?;
        trace!(definition = %definition.describe(), "Single instance created");
        let mut slot = self.value.write().unwrap();
        // another resolver may have won the race while the factory ran
        match slot.as_ref() {
            Some(existing) => Ok(existing.clone()),
            None => {
                *slot = Some(created.clone());
                Ok(created)
            }
        }
    }

    fn is_created(&self, _scope_id: Option<&str>) -> bool {
        self.value.read().unwrap().is_some()
    }

    fn release(&self, _scope_id: &str) {}

    fn close(&self) {
        self.value.write().unwrap().take();
    }
}

/// Holder for `factory` definitions: never retains anything
#[derive(Default)]
pub struct FactoryInstance;

impl FactoryInstance {
    pub fn new() -> Self {
        Self
    }
}

impl InstanceHolder for FactoryInstance {
    fn get(&self, definition: &Definition, ctx: &Context<'_>) -> Result<AnyInstance, Error> {
        trace!(definition = %definition.describe(), "Factory instance created");
        definition.create(ctx)
    }

    fn is_created(&self, _scope_id: Option<&str>) -> bool {
        false
    }

    fn release(&self, _scope_id: &str) {}

    fn close(&self) {}
}

/// Holder for `scoped` definitions: one instance per live scope instance
#[derive(Default)]
pub struct ScopedInstance {
    values: RwLock<HashMap<String, AnyInstance>>,
}

impl ScopedInstance {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstanceHolder for ScopedInstance {
    fn get(&self, definition: &Definition, ctx: &Context<'_>) -> Result<AnyInstance, Error> {
        let scope = ctx
            .scope()
            .ok_or_else(|| Error::ScopeRequired(definition.describe()))?;
        if let Some(value) = self.values.read().unwrap().get(scope.id()) {
            return Ok(value.clone());
        }
        let created = definition.create(ctx)?;
        trace!(
            definition = %definition.describe(),
            scope = scope.id(),
            "Scoped instance created"
        );
        let mut values = self.values.write().unwrap();
        match values.get(scope.id()) {
            Some(existing) => Ok(existing.clone()),
            None => {
                values.insert(scope.id().to_string(), created.clone());
                Ok(created)
            }
        }
    }

    fn is_created(&self, scope_id: Option<&str>) -> bool {
        match scope_id {
            Some(id) => self.values.read().unwrap().contains_key(id),
            None => !self.values.read().unwrap().is_empty(),
        }
    }

    fn release(&self, scope_id: &str) {
        if self.values.write().unwrap().remove(scope_id).is_some() {
            trace!(scope = scope_id, "Scoped instance released");
        }
    }

    fn close(&self) {
        self.values.write().unwrap().clear();
    }
}
