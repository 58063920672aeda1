//! Sandboxed wiring check for container definitions.
//!
//! Validates that every registered definition can be resolved without
//! running the application: each definition is cloned with a
//! [`SandboxInstance`](crate::SandboxInstance) standing in for the real
//! instance holder, the clones are registered into a throwaway container,
//! and each one is resolved to surface configuration errors (missing
//! definitions, undeclared scopes, registration conflicts) before any real
//! constructor ever runs.
//!
//! ```
//! use trellis_core::{single, AppBuilder, Module};
//! use trellis_testing::CheckModules;
//!
//! struct Mailer;
//!
//! let app = AppBuilder::new()
//!     .module(Module::new("mail").provide(single(|_| Ok(Mailer)).build()))
//!     .build()
//!     .unwrap();
//!
//! app.check_modules().unwrap();
//! ```

use crate::sandbox::SandboxInstance;
use thiserror::Error as ThisError;
use tracing::{debug, info};
use trellis_core::{App, Container, Definition, DefinitionKind, Error, Parameters};

/// A wiring check failure, naming the definition that caused it
#[derive(ThisError, Debug)]
pub enum CheckError {
    #[error("failed to register sandboxed definition {definition}: {source}")]
    Registration {
        definition: String,
        #[source]
        source: Error,
    },

    #[error("definition {definition} failed the wiring check: {source}")]
    Resolution {
        definition: String,
        #[source]
        source: Error,
    },
}

/// Run the sandboxed wiring check against every definition in `container`.
///
/// The source container is left untouched: clones are registered into a
/// fresh container seeded with the source's scope declarations and
/// properties.
pub fn check_modules(container: &Container) -> Result<(), CheckError> {
    let definitions = container.definitions();
    let sandbox = sandbox_container(container);

    register_definitions(&sandbox, &definitions)?;
    run_definitions(&sandbox, &definitions)?;

    info!(definitions = definitions.len(), "Wiring check passed");
    Ok(())
}

/// Build the throwaway container the sandboxed clones run in
fn sandbox_container(source: &Container) -> Container {
    let sandbox = Container::new();
    for name in source.scope_names() {
        sandbox.declare_scope(&name);
    }
    for (key, value) in source.properties().snapshot() {
        sandbox.set_property(&key, &value);
    }
    sandbox
}

/// Register every cloned definition with a sandbox holder
fn register_definitions(sandbox: &Container, definitions: &[Definition]) -> Result<(), CheckError> {
    for definition in definitions {
        sandbox
            .register_definition_with_holder(
                definition.clone(),
                Box::new(SandboxInstance::new()),
            )
            .map_err(|source| CheckError::Registration {
                definition: definition.describe(),
                source,
            })?;
    }
    Ok(())
}

/// Resolve every definition once, creating sandbox scopes as needed
fn run_definitions(sandbox: &Container, definitions: &[Definition]) -> Result<(), CheckError> {
    for definition in definitions {
        debug!(definition = %definition.describe(), "Checking definition");

        let scope = if definition.kind == DefinitionKind::Scoped {
            let scope_name =
                definition
                    .scope_name
                    .as_deref()
                    .ok_or_else(|| CheckError::Resolution {
                        definition: definition.describe(),
                        source: Error::MissingScopeName(definition.describe()),
                    })?;
            let scope =
                sandbox
                    .get_or_create_scope(scope_name)
                    .map_err(|source| CheckError::Resolution {
                        definition: definition.describe(),
                        source,
                    })?;
            Some(scope)
        } else {
            None
        };

        sandbox
            .resolve_any(
                definition.type_id,
                definition.type_name,
                definition.name.as_deref(),
                scope.as_deref(),
                &Parameters::empty(),
            )
            .map_err(|source| CheckError::Resolution {
                definition: definition.describe(),
                source,
            })?;
    }
    Ok(())
}

/// Extension trait hanging the wiring check off containers and apps
pub trait CheckModules {
    fn check_modules(&self) -> Result<(), CheckError>;
}

impl CheckModules for Container {
    fn check_modules(&self) -> Result<(), CheckError> {
        check_modules(self)
    }
}

impl CheckModules for App {
    fn check_modules(&self) -> Result<(), CheckError> {
        check_modules(self.container())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use trellis_core::{scoped, single, AppBuilder, Module};

    struct Database;
    struct Session;

    #[test]
    fn test_empty_container_checks_clean() {
        let container = Container::new();
        check_modules(&container).unwrap();
    }

    #[test]
    fn test_real_constructors_do_not_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let container = Container::new();
        container
            .register_definition(
                single(move |_| {
                    calls_in.fetch_add(1, Ordering::SeqCst);
                    Ok(Database)
                })
                .build(),
            )
            .unwrap();

        check_modules(&container).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // the source container still resolves for real afterwards
        container.get::<Database>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_constructor_still_checks_clean() {
        let container = Container::new();
        container
            .register_definition(
                single(|_| -> Result<Database, Error> {
                    Err(Error::InstanceCreation("database is down".to_string()))
                })
                .build(),
            )
            .unwrap();

        check_modules(&container).unwrap();
        assert!(container.get::<Database>().is_err());
    }

    #[test]
    fn test_scoped_definitions_share_a_sandbox_scope() {
        let app = AppBuilder::new()
            .module(
                Module::new("web")
                    .scoped("request", |_| Ok(Session))
                    .scoped("request", |_| Ok(Database)),
            )
            .build()
            .unwrap();

        app.check_modules().unwrap();
    }

    #[test]
    fn test_undeclared_scope_fails_the_check() {
        let container = Container::new();
        // registered directly, bypassing the module scope declaration
        container
            .register_definition(scoped("request", |_| Ok(Session)).build())
            .unwrap();

        let err = check_modules(&container).unwrap_err();
        match err {
            CheckError::Resolution { definition, source } => {
                assert!(definition.contains("Session"));
                assert!(matches!(source, Error::ScopeNotDeclared(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scoped_definition_without_scope_name_fails() {
        let container = Container::new();
        let mut definition = scoped("request", |_| Ok(Session)).build();
        definition.scope_name = None;
        container.declare_scope("request");
        container.register_definition(definition).unwrap();

        let err = check_modules(&container).unwrap_err();
        assert!(matches!(
            err,
            CheckError::Resolution {
                source: Error::MissingScopeName(_),
                ..
            }
        ));
    }

    #[test]
    fn test_named_definitions_are_checked() {
        let container = Container::new();
        container
            .register_definition(single(|_| Ok(Database)).named("analytics").build())
            .unwrap();

        check_modules(&container).unwrap();
    }
}
