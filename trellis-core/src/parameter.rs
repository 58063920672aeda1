// Injection parameters passed to definition factories at resolution time

use crate::Error;
use std::any::Any;
use std::sync::Arc;

/// Positional, heterogeneous parameters handed to a factory when a
/// component is resolved.
///
/// # Examples
///
/// ```
/// use trellis_core::{params, Parameters};
///
/// let params = params![42u16, "primary".to_string()];
/// assert_eq!(*params.get::<u16>(0).unwrap(), 42);
/// assert_eq!(*params.get::<String>(1).unwrap(), "primary");
///
/// let empty = Parameters::empty();
/// assert!(empty.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct Parameters {
    values: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Parameters {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty parameter list, the default for every resolution
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a value
    pub fn add<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    /// Get the parameter at `index`, downcast to `T`
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, Error> {
        let value = self.values.get(index).ok_or_else(|| {
            Error::InstanceCreation(format!("missing injection parameter at index {}", index))
        })?;
        value.clone().downcast::<T>().map_err(|_| {
            Error::TypeMismatch(format!(
                "injection parameter at index {} is not a {}",
                index,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameters")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Build a [`Parameters`] list from a sequence of values
#[macro_export]
macro_rules! params {
    () => {
        $crate::Parameters::empty()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut parameters = $crate::Parameters::new();
        $(parameters = parameters.add($value);)+
        parameters
    }};
}
