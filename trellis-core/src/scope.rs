// Scope declarations and live scope instances

use crate::Error;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// A live scope instance, a lifecycle boundary for scoped definitions
pub struct Scope {
    id: String,
    name: String,
    closed: AtomicBool,
}

impl Scope {
    pub(crate) fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            closed: AtomicBool::new(false),
        }
    }

    /// Unique id of this scope instance
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared scope name this instance belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the scope has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Registry of declared scope names and live scope instances
#[derive(Default)]
pub struct ScopeRegistry {
    names: RwLock<HashSet<String>>,
    scopes: RwLock<HashMap<String, Arc<Scope>>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a scope name, usually contributed by a module
    pub fn declare(&self, name: &str) {
        let mut names = self.names.write().unwrap();
        if names.insert(name.to_string()) {
            debug!(scope = name, "Scope name declared");
        }
    }

    /// Whether `name` has been declared
    pub fn is_declared(&self, name: &str) -> bool {
        self.names.read().unwrap().contains(name)
    }

    /// Snapshot of all declared scope names
    pub fn declared_names(&self) -> Vec<String> {
        self.names.read().unwrap().iter().cloned().collect()
    }

    /// Create a scope instance with an explicit id
    pub fn create_scope(&self, id: &str, name: &str) -> Result<Arc<Scope>, Error> {
        if !self.is_declared(name) {
            return Err(Error::ScopeNotDeclared(name.to_string()));
        }
        let mut scopes = self.scopes.write().unwrap();
        if scopes.contains_key(id) {
            return Err(Error::ScopeAlreadyCreated(id.to_string()));
        }
        let scope = Arc::new(Scope::new(id, name));
        scopes.insert(id.to_string(), scope.clone());
        debug!(scope = name, id = id, "Scope created");
        Ok(scope)
    }

    /// Create a scope instance with a generated unique id
    pub fn create_scope_auto(&self, name: &str) -> Result<Arc<Scope>, Error> {
        let id = format!("{}-{}", name, Uuid::new_v4());
        self.create_scope(&id, name)
    }

    /// Fetch an existing scope, or create one whose id is the scope name
    pub fn get_or_create_scope(&self, name: &str) -> Result<Arc<Scope>, Error> {
        if let Some(scope) = self.get_scope(name) {
            return Ok(scope);
        }
        self.create_scope(name, name)
    }

    /// Fetch a live scope by id
    pub fn get_scope(&self, id: &str) -> Option<Arc<Scope>> {
        self.scopes.read().unwrap().get(id).cloned()
    }

    /// Close a scope and forget it. Returns the closed scope so callers can
    /// release the instances it retained.
    pub fn close_scope(&self, id: &str) -> Result<Arc<Scope>, Error> {
        let scope = self
            .scopes
            .write()
            .unwrap()
            .remove(id)
            .ok_or_else(|| Error::ScopeNotFound(id.to_string()))?;
        scope.mark_closed();
        debug!(scope = scope.name(), id = id, "Scope closed");
        Ok(scope)
    }

    /// Close every live scope
    pub fn close(&self) -> Vec<Arc<Scope>> {
        let mut scopes = self.scopes.write().unwrap();
        let all: Vec<Arc<Scope>> = scopes.drain().map(|(_, s)| s).collect();
        for scope in &all {
            scope.mark_closed();
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_declaration() {
        let registry = ScopeRegistry::new();
        let err = registry.create_scope("s1", "session").unwrap_err();
        assert!(matches!(err, Error::ScopeNotDeclared(_)));

        registry.declare("session");
        let scope = registry.create_scope("s1", "session").unwrap();
        assert_eq!(scope.id(), "s1");
        assert_eq!(scope.name(), "session");
        assert!(!scope.is_closed());
    }

    #[test]
    fn test_duplicate_scope_id() {
        let registry = ScopeRegistry::new();
        registry.declare("session");
        registry.create_scope("s1", "session").unwrap();
        let err = registry.create_scope("s1", "session").unwrap_err();
        assert!(matches!(err, Error::ScopeAlreadyCreated(_)));
    }

    #[test]
    fn test_auto_ids_are_unique() {
        let registry = ScopeRegistry::new();
        registry.declare("session");
        let a = registry.create_scope_auto("session").unwrap();
        let b = registry.create_scope_auto("session").unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("session-"));
    }

    #[test]
    fn test_get_or_create_reuses_instance() {
        let registry = ScopeRegistry::new();
        registry.declare("session");
        let a = registry.get_or_create_scope("session").unwrap();
        let b = registry.get_or_create_scope("session").unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_close_scope() {
        let registry = ScopeRegistry::new();
        registry.declare("session");
        let scope = registry.create_scope("s1", "session").unwrap();
        let closed = registry.close_scope("s1").unwrap();
        assert!(closed.is_closed());
        assert!(scope.is_closed());
        assert!(registry.get_scope("s1").is_none());
        assert!(matches!(registry.close_scope("s1"), Err(Error::ScopeNotFound(_))));
    }

    #[test]
    fn test_close_all() {
        let registry = ScopeRegistry::new();
        registry.declare("session");
        registry.create_scope("s1", "session").unwrap();
        registry.create_scope("s2", "session").unwrap();
        let closed = registry.close();
        assert_eq!(closed.len(), 2);
        assert!(registry.get_scope("s2").is_none());
    }
}
