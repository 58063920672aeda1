// Test container bundling a container with test shortcuts

use crate::check::{check_modules, CheckError};
use crate::declare::{declare, declare_named};
use std::sync::Arc;
use trellis_core::{Container, Error, Module};

/// A container wrapper with the shortcuts tests reach for most
#[derive(Default)]
pub struct TestContainer {
    container: Container,
}

impl TestContainer {
    /// Create an empty test container
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Create a test container from modules
    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> Result<Self, Error> {
        let built = Self::new();
        built.container.register_modules(modules)?;
        Ok(built)
    }

    /// Declare a pre-built instance, replacing any existing definition
    pub fn declare<T: Send + Sync + 'static>(&self, value: T) -> Result<(), Error> {
        declare(&self.container, value)
    }

    /// Declare a named pre-built instance
    pub fn declare_named<T: Send + Sync + 'static>(
        &self,
        name: &str,
        value: T,
    ) -> Result<(), Error> {
        declare_named(&self.container, name, value)
    }

    /// Resolve a component
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.container.get::<T>()
    }

    /// Run the sandboxed wiring check
    pub fn check(&self) -> Result<(), CheckError> {
        check_modules(&self.container)
    }

    /// The underlying container
    pub fn inner(&self) -> &Container {
        &self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::single;

    struct Ledger {
        entries: usize,
    }

    #[test]
    fn test_from_modules_and_get() {
        let container = TestContainer::from_modules([
            Module::new("books").provide(single(|_| Ok(Ledger { entries: 2 })).build())
        ])
        .unwrap();

        assert_eq!(container.get::<Ledger>().unwrap().entries, 2);
        container.check().unwrap();
    }

    #[test]
    fn test_declare_shortcut() {
        let container = TestContainer::new();
        container.declare(Ledger { entries: 9 }).unwrap();
        assert_eq!(container.get::<Ledger>().unwrap().entries, 9);
    }
}
