// Sandbox instance holder used by the wiring check

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;
use trellis_core::{AnyInstance, Context, Definition, Error, InstanceHolder};

/// Placeholder value handed out instead of real component instances
#[derive(Debug, Clone, Copy)]
pub struct Sandboxed;

/// An [`InstanceHolder`] that always returns a placeholder.
///
/// The definition's factory is never invoked, so real constructors (and
/// whatever side effects they carry) stay dormant while the dependency
/// graph is exercised.
#[derive(Default)]
pub struct SandboxInstance {
    resolved: AtomicBool,
}

impl SandboxInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the sandboxed definition has been resolved at least once
    pub fn was_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }
}

impl InstanceHolder for SandboxInstance {
    fn get(&self, definition: &Definition, _ctx: &Context<'_>) -> Result<AnyInstance, Error> {
        self.resolved.store(true, Ordering::SeqCst);
        trace!(definition = %definition.describe(), "Sandbox placeholder returned");
        Ok(Arc::new(Sandboxed))
    }

    fn is_created(&self, _scope_id: Option<&str>) -> bool {
        self.was_resolved()
    }

    fn release(&self, _scope_id: &str) {}

    fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{single, Container, Parameters};

    #[test]
    fn test_sandbox_never_runs_the_factory() {
        let container = Container::new();
        container
            .register_definition_with_holder(
                single(|_| -> Result<String, Error> {
                    panic!("constructor must not run in a sandbox")
                })
                .build(),
                Box::new(SandboxInstance::new()),
            )
            .unwrap();

        let definitions = container.definitions();
        let definition = &definitions[0];
        let value = container
            .resolve_any(
                definition.type_id,
                definition.type_name,
                None,
                None,
                &Parameters::empty(),
            )
            .unwrap();
        assert!(value.downcast_ref::<Sandboxed>().is_some());
    }

    #[test]
    fn test_sandbox_tracks_resolution() {
        let holder = SandboxInstance::new();
        assert!(!holder.was_resolved());
        assert!(!holder.is_created(None));
    }
}
