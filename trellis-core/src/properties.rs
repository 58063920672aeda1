//! Property registry: key/value configuration fed to definitions.
//!
//! Properties come from three places: explicit `set` calls, the process
//! environment (with `.env` support) and configuration files. File values
//! are kept twice: flattened to dotted string keys for `get`, and as a
//! merged document tree for typed [`bind`](PropertyRegistry::bind).

use crate::Error;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;
use tracing::debug;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }
}

/// String properties with typed access and file/environment loading
pub struct PropertyRegistry {
    values: RwLock<HashMap<String, String>>,
    tree: RwLock<Value>,
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            tree: RwLock::new(Value::Object(serde_json::Map::new())),
        }
    }

    /// Set a property
    pub fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Fetch a property
    pub fn get(&self, key: &str) -> Result<String, Error> {
        self.values
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::PropertyNotFound(key.to_string()))
    }

    /// Fetch a property, falling back to a default
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|_| default.to_string())
    }

    /// Fetch a property parsed into `T`
    pub fn get_parsed<T>(&self, key: &str) -> Result<T, Error>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(key)?;
        raw.parse::<T>()
            .map_err(|e| Error::PropertyParse(format!("'{}' for key '{}': {}", raw, key, e)))
    }

    /// Deserialize a section of the merged document tree into `T`.
    ///
    /// `path` is a dotted path into the tree, e.g. `"database.pool"`.
    pub fn bind<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let tree = self.tree.read().unwrap();
        let mut node = &*tree;
        for segment in path.split('.') {
            node = node
                .get(segment)
                .ok_or_else(|| Error::PropertyNotFound(path.to_string()))?;
        }
        serde_json::from_value(node.clone())
            .map_err(|e| Error::Config(format!("cannot bind '{}': {}", path, e)))
    }

    /// Whether a property is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.read().unwrap().contains_key(key)
    }

    /// Copy of every property
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.read().unwrap().clone()
    }

    /// Load the process environment, honoring a `.env` file when present
    pub fn load_env(&self) {
        dotenvy::dotenv().ok();
        let mut values = self.values.write().unwrap();
        let mut count = 0usize;
        for (key, value) in std::env::vars() {
            values.insert(key, value);
            count += 1;
        }
        debug!(property_count = count, "Environment properties loaded");
    }

    /// Load a configuration file, format detected from the extension
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Config(format!("no file extension: {}", path.display())))?;
        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| Error::Config(format!("unsupported format: {}", ext)))?;
        let content = std::fs::read_to_string(path)?;
        self.load_str(&content, format)?;
        debug!(file = %path.display(), "Property file loaded");
        Ok(())
    }

    /// Load properties from a string in the given format
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<(), Error> {
        match format {
            FileFormat::Json => {
                let value: Value = serde_json::from_str(content)
                    .map_err(|e| Error::Config(format!("JSON parse error: {}", e)))?;
                self.absorb(value);
            }
            FileFormat::Toml => {
                let value: toml::Value = toml::from_str(content)
                    .map_err(|e| Error::Config(format!("TOML parse error: {}", e)))?;
                let value = serde_json::to_value(value)
                    .map_err(|e| Error::Config(format!("TOML conversion error: {}", e)))?;
                self.absorb(value);
            }
            FileFormat::Env => {
                for line in content.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((key, value)) = line.split_once('=') {
                        let key = key.trim();
                        let value = value.trim().trim_matches('"').trim_matches('\'');
                        self.set(key, value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove every property
    pub fn clear(&self) {
        self.values.write().unwrap().clear();
        *self.tree.write().unwrap() = Value::Object(serde_json::Map::new());
    }

    fn absorb(&self, value: Value) {
        let mut flat = HashMap::new();
        flatten("", &value, &mut flat);
        {
            let mut values = self.values.write().unwrap();
            for (key, value) in flat {
                values.insert(key, value);
            }
        }
        merge(&mut self.tree.write().unwrap(), value);
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&key, value, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

fn merge(base: &mut Value, incoming: Value) {
    if let Value::Object(incoming_map) = incoming {
        if let Value::Object(base_map) = base {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
            return;
        }
        *base = Value::Object(incoming_map);
        return;
    }
    // scalars and arrays: the last loaded source wins
    *base = incoming;
}
