// Core library for the trellis dependency injection container
// Definitions, registries, scopes, modules and the resolution runtime

pub mod application;
pub mod container;
pub mod context;
pub mod definition;
pub mod error;
pub mod instance;
pub mod logging;
pub mod module;
pub mod parameter;
pub mod properties;
pub mod registry;
pub mod scope;

// Re-export commonly used types
pub use application::{App, AppBuilder};
pub use container::{Container, Context};
pub use definition::{
    factory, instance, scoped, single, AnyInstance, Definition, DefinitionBuilder, DefinitionKind,
    Options, TypeBinding,
};
pub use error::Error;
pub use instance::{FactoryInstance, InstanceHolder, ScopedInstance, SingleInstance};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use module::Module;
pub use parameter::Parameters;
pub use properties::{FileFormat, PropertyRegistry};
pub use registry::DefinitionRegistry;
pub use scope::{Scope, ScopeRegistry};
