// Application bootstrapper: assembles a container from modules and properties

use crate::{Container, Error, Module};
use std::path::PathBuf;
use tracing::{debug, info};

/// A bootstrapped application wrapping its container.
///
/// ```
/// use trellis_core::{single, AppBuilder, Module};
///
/// struct Clock;
///
/// let app = AppBuilder::new()
///     .module(Module::new("infra").provide(single(|_| Ok(Clock)).build()))
///     .property("region", "eu-west-1")
///     .build()
///     .unwrap();
///
/// assert!(app.container().has::<Clock>());
/// assert_eq!(app.container().get_property("region").unwrap(), "eu-west-1");
/// ```
#[derive(Clone)]
pub struct App {
    container: Container,
}

impl App {
    /// Start building an application
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// The underlying container
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Close the container, dropping every retained instance
    pub fn close(&self) {
        self.container.close();
    }
}

/// Builder collecting modules and property sources
#[derive(Default)]
pub struct AppBuilder {
    modules: Vec<Module>,
    property_files: Vec<PathBuf>,
    load_env: bool,
    properties: Vec<(String, String)>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Add several modules
    pub fn modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Load properties from a configuration file at build time
    pub fn properties_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.property_files.push(path.into());
        self
    }

    /// Load the process environment into properties at build time
    pub fn properties_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Set a single property
    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    /// Assemble the container: load properties, register modules, create
    /// eager instances
    pub fn build(self) -> Result<App, Error> {
        let container = Container::new();

        if self.load_env {
            container.properties().load_env();
        }
        for path in &self.property_files {
            container.properties().load_file(path)?;
        }
        for (key, value) in &self.properties {
            container.set_property(key, value);
        }

        let module_count = self.modules.len();
        container.register_modules(self.modules)?;
        container.create_eager_instances()?;

        info!(
            modules = module_count,
            definitions = container.definition_count(),
            "Application assembled"
        );
        debug!(scopes = ?container.scope_names(), "Declared scopes");

        Ok(App { container })
    }
}
