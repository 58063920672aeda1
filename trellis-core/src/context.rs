// Process-wide default application

use crate::{App, Error};
use once_cell::sync::Lazy;
use std::sync::RwLock;
use tracing::debug;

static GLOBAL: Lazy<RwLock<Option<App>>> = Lazy::new(|| RwLock::new(None));

/// Install `app` as the process-wide default
pub fn start(app: App) -> Result<(), Error> {
    let mut slot = GLOBAL.write().unwrap();
    if slot.is_some() {
        return Err(Error::AlreadyStarted);
    }
    *slot = Some(app);
    debug!("Global application context started");
    Ok(())
}

/// Fetch the process-wide default application
pub fn get() -> Result<App, Error> {
    GLOBAL.read().unwrap().clone().ok_or(Error::NotStarted)
}

/// Whether a default application is installed
pub fn is_started() -> bool {
    GLOBAL.read().unwrap().is_some()
}

/// Tear down the process-wide default, closing its container
pub fn stop() {
    if let Some(app) = GLOBAL.write().unwrap().take() {
        app.close();
        debug!("Global application context stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{single, AppBuilder, Module};

    struct Clock;

    // one test drives the whole lifecycle so parallel tests never race on
    // the process-wide slot
    #[test]
    fn test_global_context_lifecycle() {
        assert!(!is_started());
        assert!(matches!(get(), Err(Error::NotStarted)));

        let app = AppBuilder::new()
            .module(Module::new("infra").provide(single(|_| Ok(Clock)).build()))
            .build()
            .unwrap();

        start(app).unwrap();
        assert!(is_started());
        assert!(get().unwrap().container().has::<Clock>());

        let other = AppBuilder::new().build().unwrap();
        assert!(matches!(start(other), Err(Error::AlreadyStarted)));

        stop();
        assert!(!is_started());
        stop();
    }
}
