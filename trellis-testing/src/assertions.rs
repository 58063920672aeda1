// Panicking assertions for container tests

use crate::check::check_modules;
use trellis_core::Container;

/// Assert that `T` resolves from the container
pub fn assert_resolves<T: ?Sized + Send + Sync + 'static>(container: &Container) {
    if let Err(e) = container.get::<T>() {
        panic!(
            "expected {} to resolve, got: {}",
            std::any::type_name::<T>(),
            e
        );
    }
}

/// Assert that no definition answers for `T`
pub fn assert_not_registered<T: ?Sized + Send + Sync + 'static>(container: &Container) {
    if container.has::<T>() {
        panic!(
            "expected no definition for {}, found one",
            std::any::type_name::<T>()
        );
    }
}

/// Assert the number of registered definitions
pub fn assert_definition_count(container: &Container, expected: usize) {
    let actual = container.definition_count();
    if actual != expected {
        panic!("expected {} definitions, found {}", expected, actual);
    }
}

/// Assert that the sandboxed wiring check passes
pub fn assert_checks(container: &Container) {
    if let Err(e) = check_modules(container) {
        panic!("expected the wiring check to pass, got: {}", e);
    }
}
