// Modules: named bundles of definitions and scope declarations

use crate::container::Context;
use crate::definition::{factory, scoped, single, Definition};
use crate::Error;

/// A named collection of definitions contributed to a container together.
///
/// ```
/// use trellis_core::{single, Module};
///
/// struct Clock;
/// struct Audit;
///
/// let module = Module::new("infra")
///     .single(|_| Ok(Clock))
///     .provide(single(|_| Ok(Audit)).named("audit").build())
///     .declare_scope("request");
///
/// assert_eq!(module.name(), "infra");
/// assert_eq!(module.definitions().len(), 2);
/// assert_eq!(module.scope_names(), &["request".to_string()]);
/// ```
pub struct Module {
    name: String,
    definitions: Vec<Definition>,
    scope_names: Vec<String>,
}

impl Module {
    /// Create an empty module
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            definitions: Vec::new(),
            scope_names: Vec::new(),
        }
    }

    /// Module name, used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a fully configured definition
    pub fn provide(mut self, definition: Definition) -> Self {
        if let Some(scope_name) = &definition.scope_name {
            self.push_scope_name(scope_name.clone());
        }
        self.definitions.push(definition);
        self
    }

    /// Add a shared component
    pub fn single<T, F>(self, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&Context<'a>) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.provide(single(f).build())
    }

    /// Add a component built on every resolution
    pub fn factory<T, F>(self, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&Context<'a>) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.provide(factory(f).build())
    }

    /// Add a scoped component; the scope name is declared automatically
    pub fn scoped<T, F>(self, scope_name: &str, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&Context<'a>) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.provide(scoped(scope_name, f).build())
    }

    /// Declare a scope name without contributing a definition for it
    pub fn declare_scope(mut self, name: &str) -> Self {
        self.push_scope_name(name.to_string());
        self
    }

    /// Definitions contributed by this module
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Scope names declared by this module
    pub fn scope_names(&self) -> &[String] {
        &self.scope_names
    }

    pub(crate) fn into_definitions(self) -> Vec<Definition> {
        self.definitions
    }

    fn push_scope_name(&mut self, name: String) {
        if !self.scope_names.contains(&name) {
            self.scope_names.push(name);
        }
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("definitions", &self.definitions.len())
            .field("scope_names", &self.scope_names)
            .finish()
    }
}
