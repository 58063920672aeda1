// Declare pre-built instances into a container under test

use tracing::debug;
use trellis_core::{instance, Container, Error};

/// Register `value` as the shared instance for `T`, replacing any existing
/// definition.
///
/// The canonical way to slide a test double under the component graph:
///
/// ```
/// use trellis_core::{single, Container};
/// use trellis_testing::declare;
///
/// struct Clock { now: u64 }
///
/// let container = Container::new();
/// container
///     .register_definition(single(|_| Ok(Clock { now: 0 })).build())
///     .unwrap();
///
/// declare(&container, Clock { now: 1723 }).unwrap();
/// assert_eq!(container.get::<Clock>().unwrap().now, 1723);
/// ```
pub fn declare<T: Send + Sync + 'static>(container: &Container, value: T) -> Result<(), Error> {
    debug!(component = std::any::type_name::<T>(), "Declaring test instance");
    container.register_definition(instance(value).allow_override().build())
}

/// Register `value` as the named shared instance for `T`
pub fn declare_named<T: Send + Sync + 'static>(
    container: &Container,
    name: &str,
    value: T,
) -> Result<(), Error> {
    debug!(
        component = std::any::type_name::<T>(),
        name = name,
        "Declaring named test instance"
    );
    container.register_definition(instance(value).named(name).allow_override().build())
}
