// Call-recording mocks for container services

use std::sync::{Arc, Mutex};

/// Mock service that records its calls and hands back a canned value.
///
/// Registered into a container with [`declare`](crate::declare), it stands
/// in for a real service while tests assert on how it was driven.
#[derive(Clone)]
pub struct MockService<T> {
    calls: Arc<Mutex<Vec<String>>>,
    return_value: Arc<Mutex<Option<T>>>,
}

impl<T> Default for MockService<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MockService<T> {
    /// Create a new mock service
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            return_value: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the canned return value
    pub fn with_return(self, value: T) -> Self {
        *self.return_value.lock().unwrap() = Some(value);
        self
    }

    /// Record a method call
    pub fn record_call(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }

    /// Number of recorded calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether a method was called
    pub fn was_called(&self, method: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|m| m == method)
    }

    /// Forget every recorded call
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// The canned return value
    pub fn canned(&self) -> Option<T>
    where
        T: Clone,
    {
        self.return_value.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare;
    use trellis_core::Container;

    #[test]
    fn test_mock_records_calls() {
        let mock = MockService::<String>::new();
        mock.record_call("find_user");
        mock.record_call("find_user");
        mock.record_call("save_user");

        assert_eq!(mock.call_count(), 3);
        assert!(mock.was_called("save_user"));
        assert!(!mock.was_called("delete_user"));
        assert_eq!(mock.calls()[0], "find_user");

        mock.clear_calls();
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_mock_canned_return() {
        let mock = MockService::new().with_return(42u32);
        assert_eq!(mock.canned(), Some(42));
    }

    #[test]
    fn test_mock_through_container() {
        let container = Container::new();
        let mock = MockService::<String>::new().with_return("ok".to_string());
        declare(&container, mock.clone()).unwrap();

        let resolved = container.get::<MockService<String>>().unwrap();
        resolved.record_call("ping");

        // the resolved mock shares state with the local handle
        assert!(mock.was_called("ping"));
        assert_eq!(resolved.canned(), Some("ok".to_string()));
    }
}
