// Trellis - lightweight dependency injection for Rust
//
// This library provides a module-based approach to assembling applications
// with constructor injection, scopes and a sandboxed wiring checker.

// Re-export core functionality
pub use trellis_core::*;

// Re-export optional crates
#[cfg(feature = "testing")]
pub use trellis_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        factory, instance, params, scoped, single, App, AppBuilder, Container, Context,
        Definition, DefinitionKind, Error, LogConfig, Module, Parameters, Scope,
    };
}
