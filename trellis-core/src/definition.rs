//! Component definitions and the builder DSL used to declare them.
//!
//! A [`Definition`] is a type-erased recipe for producing a component:
//! its primary type, an optional qualifier name, a lifetime kind, secondary
//! type bindings and the factory closure that builds the instance.
//!
//! Definitions are declared through [`single`], [`factory`], [`scoped`] and
//! [`instance`], then collected into a [`Module`](crate::Module):
//!
//! ```
//! use trellis_core::{single, scoped, Error, Module};
//!
//! struct Database;
//! struct Session { user: String }
//!
//! let module = Module::new("app")
//!     .provide(single(|_| Ok(Database)).named("primary").build())
//!     .provide(
//!         scoped("session", |ctx| {
//!             Ok(Session { user: ctx.parameters().get::<String>(0).map(|u| (*u).clone())? })
//!         })
//!         .build(),
//!     );
//! assert_eq!(module.definitions().len(), 2);
//! ```

use crate::container::Context;
use crate::Error;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// A resolved component instance, type-erased.
///
/// The payload is always an `Arc<T>` wrapped in the `Any`, so unsized
/// targets (trait objects) travel through the same resolution path as
/// concrete types.
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

pub(crate) type FactoryFn =
    Arc<dyn for<'a> Fn(&Context<'a>) -> Result<AnyInstance, Error> + Send + Sync>;

type CastFn = Arc<dyn Fn(&AnyInstance) -> Option<AnyInstance> + Send + Sync>;

/// Lifetime kind of a definition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefinitionKind {
    /// One shared instance for the whole container
    Single,
    /// A fresh instance on every resolution
    Factory,
    /// One instance per scope instance
    Scoped,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Single => "single",
            DefinitionKind::Factory => "factory",
            DefinitionKind::Scoped => "scoped",
        }
    }
}

/// Registration options for a definition
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Eagerly create the instance when the application is built
    pub create_at_start: bool,
    /// Allow this definition to replace an existing one
    pub override_existing: bool,
}

/// A secondary type a definition is bound to, with the upcast used to
/// produce it from the concrete instance
#[derive(Clone)]
pub struct TypeBinding {
    pub type_id: TypeId,
    pub type_name: &'static str,
    cast: CastFn,
}

impl TypeBinding {
    pub(crate) fn cast(&self, value: &AnyInstance) -> Option<AnyInstance> {
        (self.cast)(value)
    }
}

impl std::fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeBinding")
            .field("type_id", &self.type_id)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A registered recipe for producing a component instance
#[derive(Clone)]
pub struct Definition {
    /// TypeId of the concrete component type
    pub type_id: TypeId,
    /// Human-readable type name
    pub type_name: &'static str,
    /// Optional qualifier, lets several definitions of one type coexist
    pub name: Option<String>,
    /// Lifetime kind
    pub kind: DefinitionKind,
    /// Scope name, set for scoped definitions
    pub scope_name: Option<String>,
    /// Secondary types this definition also answers for
    pub secondary_types: Vec<TypeBinding>,
    /// Registration options
    pub options: Options,
    /// Free-form attributes attached at declaration time
    pub attributes: HashMap<String, String>,
    factory: FactoryFn,
}

impl Definition {
    /// Run the factory closure
    pub(crate) fn create(&self, ctx: &Context<'_>) -> Result<AnyInstance, Error> {
        (self.factory)(ctx)
    }

    /// Short description used in errors and logs
    pub fn describe(&self) -> String {
        let mut out = format!("{}(type: '{}'", self.kind.as_str(), self.type_name);
        if let Some(name) = &self.name {
            out.push_str(&format!(", name: '{}'", name));
        }
        if let Some(scope) = &self.scope_name {
            out.push_str(&format!(", scope: '{}'", scope));
        }
        out.push(')');
        out
    }
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("scope_name", &self.scope_name)
            .finish()
    }
}

/// Declare a shared component, created on first resolution
pub fn single<T, F>(factory: F) -> DefinitionBuilder<T>
where
    T: Send + Sync + 'static,
    F: for<'a> Fn(&Context<'a>) -> Result<T, Error> + Send + Sync + 'static,
{
    DefinitionBuilder::new(DefinitionKind::Single, None, factory)
}

/// Declare a component built fresh on every resolution
pub fn factory<T, F>(factory: F) -> DefinitionBuilder<T>
where
    T: Send + Sync + 'static,
    F: for<'a> Fn(&Context<'a>) -> Result<T, Error> + Send + Sync + 'static,
{
    DefinitionBuilder::new(DefinitionKind::Factory, None, factory)
}

/// Declare a component living inside the named scope
pub fn scoped<T, F>(scope_name: &str, factory: F) -> DefinitionBuilder<T>
where
    T: Send + Sync + 'static,
    F: for<'a> Fn(&Context<'a>) -> Result<T, Error> + Send + Sync + 'static,
{
    DefinitionBuilder::new(DefinitionKind::Scoped, Some(scope_name.to_string()), factory)
}

/// Declare a pre-built shared instance
pub fn instance<T>(value: T) -> DefinitionBuilder<T>
where
    T: Send + Sync + 'static,
{
    let shared: Arc<T> = Arc::new(value);
    let erased: FactoryFn = Arc::new(move |_ctx| Ok(Arc::new(shared.clone()) as AnyInstance));
    DefinitionBuilder::from_erased(DefinitionKind::Single, None, erased)
}

/// Fluent builder for a [`Definition`], typed until [`build`](Self::build)
pub struct DefinitionBuilder<T> {
    kind: DefinitionKind,
    name: Option<String>,
    scope_name: Option<String>,
    secondary_types: Vec<TypeBinding>,
    options: Options,
    attributes: HashMap<String, String>,
    factory: FactoryFn,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DefinitionBuilder<T> {
    fn new<F>(kind: DefinitionKind, scope_name: Option<String>, factory: F) -> Self
    where
        F: for<'a> Fn(&Context<'a>) -> Result<T, Error> + Send + Sync + 'static,
    {
        let erased: FactoryFn = Arc::new(move |ctx| {
            let value = factory(ctx)?;
            let shared: Arc<T> = Arc::new(value);
            Ok(Arc::new(shared) as AnyInstance)
        });
        Self::from_erased(kind, scope_name, erased)
    }

    fn from_erased(kind: DefinitionKind, scope_name: Option<String>, factory: FactoryFn) -> Self {
        Self {
            kind,
            name: None,
            scope_name,
            secondary_types: Vec::new(),
            options: Options::default(),
            attributes: HashMap::new(),
            factory,
            _marker: PhantomData,
        }
    }

    /// Qualify the definition with a name
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Also answer for `U`, usually a trait object the component implements.
    ///
    /// The cast receives the shared concrete instance and upcasts it:
    ///
    /// ```
    /// use trellis_core::single;
    ///
    /// trait Greeter: Send + Sync { fn hello(&self) -> String; }
    /// struct English;
    /// impl Greeter for English {
    ///     fn hello(&self) -> String { "hello".to_string() }
    /// }
    ///
    /// let definition = single(|_| Ok(English)).bind::<dyn Greeter>(|e| e).build();
    /// assert_eq!(definition.secondary_types.len(), 1);
    /// ```
    pub fn bind<U>(mut self, cast: fn(Arc<T>) -> Arc<U>) -> Self
    where
        U: ?Sized + Send + Sync + 'static,
    {
        let caster: CastFn = Arc::new(move |value: &AnyInstance| {
            let concrete = value.downcast_ref::<Arc<T>>()?.clone();
            let bound: Arc<U> = cast(concrete);
            Some(Arc::new(bound) as AnyInstance)
        });
        self.secondary_types.push(TypeBinding {
            type_id: TypeId::of::<U>(),
            type_name: std::any::type_name::<U>(),
            cast: caster,
        });
        self
    }

    /// Create the instance eagerly when the application is built
    pub fn create_at_start(mut self) -> Self {
        self.options.create_at_start = true;
        self
    }

    /// Allow this definition to replace an already registered one
    pub fn allow_override(mut self) -> Self {
        self.options.override_existing = true;
        self
    }

    /// Attach a free-form attribute
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Finish the declaration
    pub fn build(self) -> Definition {
        Definition {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: self.name,
            kind: self.kind,
            scope_name: self.scope_name,
            secondary_types: self.secondary_types,
            options: self.options,
            attributes: self.attributes,
            factory: self.factory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Repository;

    trait Port: Send + Sync {}
    impl Port for Repository {}

    #[test]
    fn test_single_builder() {
        let definition = single(|_| Ok(Repository)).build();
        assert_eq!(definition.kind, DefinitionKind::Single);
        assert_eq!(definition.type_id, TypeId::of::<Repository>());
        assert!(definition.name.is_none());
        assert!(definition.scope_name.is_none());
        assert!(!definition.options.create_at_start);
    }

    #[test]
    fn test_named_scoped_builder() {
        let definition = scoped("request", |_| Ok(Repository))
            .named("audit")
            .with_attribute("tier", "storage")
            .build();
        assert_eq!(definition.kind, DefinitionKind::Scoped);
        assert_eq!(definition.name.as_deref(), Some("audit"));
        assert_eq!(definition.scope_name.as_deref(), Some("request"));
        assert_eq!(definition.attributes.get("tier").map(String::as_str), Some("storage"));
    }

    #[test]
    fn test_bind_records_secondary_type() {
        let definition = single(|_| Ok(Repository)).bind::<dyn Port>(|r| r).build();
        assert_eq!(definition.secondary_types.len(), 1);
        assert_eq!(definition.secondary_types[0].type_id, TypeId::of::<dyn Port>());
    }

    #[test]
    fn test_describe() {
        let definition = scoped("session", |_| Ok(Repository)).named("cache").build();
        let text = definition.describe();
        assert!(text.starts_with("scoped"));
        assert!(text.contains("Repository"));
        assert!(text.contains("name: 'cache'"));
        assert!(text.contains("scope: 'session'"));
    }

    #[test]
    fn test_definition_is_cheap_to_clone() {
        let definition = single(|_| Ok(Repository)).build();
        let copy = definition.clone();
        assert_eq!(copy.type_id, definition.type_id);
        assert_eq!(copy.kind, definition.kind);
    }
}
