//! The dependency injection container.
//!
//! A [`Container`] owns three registries: definitions, scopes and
//! properties. Modules contribute definitions and scope declarations;
//! resolution walks definition lookup, scope validation, the instance
//! holder and finally a typed downcast.
//!
//! ```
//! use trellis_core::{single, Container, Module};
//!
//! struct Config { url: String }
//! struct Database { url: String }
//!
//! let container = Container::new();
//! container
//!     .register_modules([Module::new("app")
//!         .provide(single(|_| Ok(Config { url: "postgres://localhost".into() })).build())
//!         .provide(
//!             single(|ctx| {
//!                 let config = ctx.get::<Config>()?;
//!                 Ok(Database { url: config.url.clone() })
//!             })
//!             .build(),
//!         )])
//!     .unwrap();
//!
//! let database = container.get::<Database>().unwrap();
//! assert_eq!(database.url, "postgres://localhost");
//! ```

use crate::definition::{AnyInstance, Definition, DefinitionKind};
use crate::instance::{FactoryInstance, InstanceHolder, ScopedInstance, SingleInstance};
use crate::module::Module;
use crate::properties::PropertyRegistry;
use crate::registry::DefinitionRegistry;
use crate::scope::{Scope, ScopeRegistry};
use crate::{Error, Parameters};
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolution context handed to definition factories
pub struct Context<'a> {
    container: &'a Container,
    scope: Option<&'a Scope>,
    parameters: &'a Parameters,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        container: &'a Container,
        scope: Option<&'a Scope>,
        parameters: &'a Parameters,
    ) -> Self {
        Self {
            container,
            scope,
            parameters,
        }
    }

    /// Resolve a dependency, staying inside the current scope
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.container
            .get_with(None, self.scope, &Parameters::empty())
    }

    /// Resolve a named dependency
    pub fn get_named<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.container
            .get_with(Some(name), self.scope, &Parameters::empty())
    }

    /// The injection parameters of this resolution
    pub fn parameters(&self) -> &Parameters {
        self.parameters
    }

    /// The scope this resolution runs in, if any
    pub fn scope(&self) -> Option<&Scope> {
        self.scope
    }

    /// Fetch a property from the container
    pub fn get_property(&self, key: &str) -> Result<String, Error> {
        self.container.properties().get(key)
    }
}

/// The dependency injection container
#[derive(Clone, Default)]
pub struct Container {
    definitions: Arc<DefinitionRegistry>,
    scopes: Arc<ScopeRegistry>,
    properties: Arc<PropertyRegistry>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new container");
        Self::default()
    }

    /// Register every definition and scope declaration from the modules
    pub fn register_modules(
        &self,
        modules: impl IntoIterator<Item = Module>,
    ) -> Result<(), Error> {
        for module in modules {
            debug!(module = module.name(), "Registering module");
            for scope_name in module.scope_names() {
                self.scopes.declare(scope_name);
            }
            for definition in module.into_definitions() {
                self.register_definition(definition)?;
            }
        }
        Ok(())
    }

    /// Register a definition with the holder matching its kind
    pub fn register_definition(&self, definition: Definition) -> Result<(), Error> {
        let holder: Box<dyn InstanceHolder> = match definition.kind {
            DefinitionKind::Single => Box::new(SingleInstance::new()),
            DefinitionKind::Factory => Box::new(FactoryInstance::new()),
            DefinitionKind::Scoped => Box::new(ScopedInstance::new()),
        };
        self.register_definition_with_holder(definition, holder)
    }

    /// Register a definition with an explicit instance holder.
    ///
    /// This is the hook test harnesses use to substitute holders that never
    /// run the real factory.
    pub fn register_definition_with_holder(
        &self,
        definition: Definition,
        holder: Box<dyn InstanceHolder>,
    ) -> Result<(), Error> {
        self.definitions.save(definition, holder)
    }

    /// Resolve a component by type
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.get_with(None, None, &Parameters::empty())
    }

    /// Resolve a named component
    pub fn get_named<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.get_with(Some(name), None, &Parameters::empty())
    }

    /// Resolve a component inside a scope
    pub fn get_in_scope<T: ?Sized + Send + Sync + 'static>(
        &self,
        scope: &Scope,
    ) -> Result<Arc<T>, Error> {
        self.get_with(None, Some(scope), &Parameters::empty())
    }

    /// Resolve with full control over qualifier, scope and parameters
    pub fn get_with<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: Option<&str>,
        scope: Option<&Scope>,
        parameters: &Parameters,
    ) -> Result<Arc<T>, Error> {
        let type_name = std::any::type_name::<T>();
        let value = self.resolve_any(TypeId::of::<T>(), type_name, name, scope, parameters)?;
        value.downcast_ref::<Arc<T>>().cloned().ok_or_else(|| {
            Error::TypeMismatch(format!(
                "resolved instance does not have the requested type {}",
                type_name
            ))
        })
    }

    /// Resolve a component without the final typed downcast.
    ///
    /// Everything else happens: definition lookup, scope validation, the
    /// instance holder, secondary type casts. Validation passes resolve
    /// through here so placeholder instances never have to impersonate the
    /// requested type.
    pub fn resolve_any(
        &self,
        type_id: TypeId,
        type_name: &str,
        name: Option<&str>,
        scope: Option<&Scope>,
        parameters: &Parameters,
    ) -> Result<AnyInstance, Error> {
        trace!(component = type_name, name = ?name, "Resolving component");
        let (entry, binding) = self.definitions.find(type_id, name).ok_or_else(|| {
            Error::DefinitionNotFound(match name {
                Some(name) => format!("{} (name: '{}')", type_name, name),
                None => type_name.to_string(),
            })
        })?;

        let definition = &entry.definition;
        let scope = self.validate_scope(definition, scope)?;

        let ctx = Context::new(self, scope, parameters);
        let value = entry.holder.get(definition, &ctx)?;

        match binding {
            Some(binding) => binding.cast(&value).ok_or_else(|| {
                Error::TypeMismatch(format!(
                    "bound type {} cannot be produced from {}",
                    binding.type_name, definition.type_name
                ))
            }),
            None => Ok(value),
        }
    }

    fn validate_scope<'a>(
        &self,
        definition: &Definition,
        scope: Option<&'a Scope>,
    ) -> Result<Option<&'a Scope>, Error> {
        if definition.kind != DefinitionKind::Scoped {
            return Ok(scope);
        }
        let scope = scope.ok_or_else(|| Error::ScopeRequired(definition.describe()))?;
        if scope.is_closed() {
            return Err(Error::ScopeClosed(scope.id().to_string()));
        }
        match &definition.scope_name {
            Some(name) if name == scope.name() => Ok(Some(scope)),
            Some(name) => Err(Error::ScopeMismatch(format!(
                "{} cannot be resolved from scope '{}' (expects '{}')",
                definition.describe(),
                scope.name(),
                name
            ))),
            None => Err(Error::MissingScopeName(definition.describe())),
        }
    }

    /// Whether a definition answers for `T`
    pub fn has<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.definitions.contains(TypeId::of::<T>())
    }

    /// Snapshot of every registered definition
    pub fn definitions(&self) -> Vec<Definition> {
        self.definitions.definitions()
    }

    /// Number of registered definitions
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Declared scope names
    pub fn scope_names(&self) -> Vec<String> {
        self.scopes.declared_names()
    }

    /// Declare a scope name
    pub fn declare_scope(&self, name: &str) {
        self.scopes.declare(name);
    }

    /// Create a scope instance with an explicit id
    pub fn create_scope(&self, id: &str, name: &str) -> Result<Arc<Scope>, Error> {
        self.scopes.create_scope(id, name)
    }

    /// Create a scope instance with a generated id
    pub fn create_scope_auto(&self, name: &str) -> Result<Arc<Scope>, Error> {
        self.scopes.create_scope_auto(name)
    }

    /// Fetch an existing scope by name, or create one named after it
    pub fn get_or_create_scope(&self, name: &str) -> Result<Arc<Scope>, Error> {
        self.scopes.get_or_create_scope(name)
    }

    /// Fetch a live scope by id
    pub fn get_scope(&self, id: &str) -> Option<Arc<Scope>> {
        self.scopes.get_scope(id)
    }

    /// Close a scope and drop the instances it retained
    pub fn close_scope(&self, id: &str) -> Result<(), Error> {
        let scope = self.scopes.close_scope(id)?;
        self.definitions.release_scope(scope.id());
        Ok(())
    }

    /// The property registry
    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    /// Fetch a property
    pub fn get_property(&self, key: &str) -> Result<String, Error> {
        self.properties.get(key)
    }

    /// Set a property
    pub fn set_property(&self, key: &str, value: &str) {
        self.properties.set(key, value);
    }

    /// Eagerly create every `single` flagged `create_at_start`
    pub fn create_eager_instances(&self) -> Result<(), Error> {
        for definition in self.definitions() {
            if !definition.options.create_at_start {
                continue;
            }
            if definition.kind != DefinitionKind::Single {
                continue;
            }
            trace!(definition = %definition.describe(), "Creating eager instance");
            self.resolve_any(
                definition.type_id,
                definition.type_name,
                definition.name.as_deref(),
                None,
                &Parameters::empty(),
            )?;
        }
        Ok(())
    }

    /// Drop every retained instance, close every scope, clear properties
    pub fn close(&self) {
        debug!("Closing container");
        for scope in self.scopes.close() {
            self.definitions.release_scope(scope.id());
        }
        self.definitions.close();
        self.properties.clear();
    }
}
