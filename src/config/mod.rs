//! Layered runtime configuration.
//!
//! Sources in decreasing priority:
//!
//! - command-line arguments (`--logger:level=debug`)
//! - `LEPTON_`-prefixed environment variables (`LEPTON_LOGGER__LEVEL=debug`)
//! - the user file `~/.leptonrc` (JSON object)
//! - built-in defaults (`defaults.rs`)
//!
//! The store is resolved once at startup and is read-only afterwards. Lookups
//! for any key path present in the defaults always produce a value; unknown
//! key paths produce `None` instead of a guessed default.

pub mod defaults;
pub mod sources;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LeptonError;

pub use defaults::default_config;
pub use sources::KEY_SEPARATOR;

/// Where a configuration layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Argv,
    Env,
    File,
    Defaults,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Argv => write!(f, "argv"),
            SourceKind::Env => write!(f, "env"),
            SourceKind::File => write!(f, "file"),
            SourceKind::Defaults => write!(f, "defaults"),
        }
    }
}

/// One named configuration layer.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub kind: SourceKind,
    pub name: String,
    pub values: Map<String, Value>,
}

/// Builder collecting raw inputs before resolution.
pub struct ConfigResolver {
    args: Vec<String>,
    env: Vec<(String, String)>,
    file: Option<PathBuf>,
    defaults: Value,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            env: Vec::new(),
            file: None,
            defaults: default_config(),
        }
    }

    /// Resolver fed from the running process: argv, environment and the
    /// user file at `config_file`.
    pub fn from_process(config_file: &Path) -> Self {
        Self::new()
            .with_args(std::env::args().skip(1))
            .with_env(std::env::vars())
            .with_file(config_file)
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    /// Merge every layer into a `ConfigStore`.
    ///
    /// Never fails: a broken user file is recorded as an error and skipped,
    /// overlay values that would break a defaults key path are recorded as
    /// warnings and skipped. Both are logged by [`ConfigStore::report`].
    pub fn resolve(self) -> ConfigStore {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let defaults = match self.defaults {
            Value::Object(map) => map,
            other => {
                warnings.push(format!("built-in defaults are not an object: {}", other));
                Map::new()
            },
        };
        let defaults_tree = Value::Object(defaults.clone());

        let mut layers = vec![
            ConfigSource {
                kind: SourceKind::Argv,
                name: "argv".to_string(),
                values: sources::parse_args(&self.args),
            },
            ConfigSource {
                kind: SourceKind::Env,
                name: "env".to_string(),
                values: sources::parse_env(self.env.iter().map(|(k, v)| (k, v)), &defaults_tree),
            },
        ];

        if let Some(path) = &self.file {
            match sources::read_config_file(path) {
                Ok(Some(values)) => layers.push(ConfigSource {
                    kind: SourceKind::File,
                    name: path.display().to_string(),
                    values,
                }),
                Ok(None) => {},
                Err(err) => errors.push(err),
            }
        }

        layers.push(ConfigSource {
            kind: SourceKind::Defaults,
            name: "defaults".to_string(),
            values: defaults.clone(),
        });

        let mut merged = defaults;
        for source in layers.iter().rev().skip(1) {
            overlay(&mut merged, &source.values, "", source.kind, &mut warnings);
        }

        ConfigStore {
            sources: layers,
            merged: Value::Object(merged),
            config_file: self.file,
            errors,
            warnings,
        }
    }
}

fn overlay(
    base: &mut Map<String, Value>,
    layer: &Map<String, Value>,
    prefix: &str,
    kind: SourceKind,
    warnings: &mut Vec<String>,
) {
    for (key, value) in layer {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, KEY_SEPARATOR, key)
        };

        if value.is_null() {
            warnings.push(format!("{} sets \"{}\" to null; ignored", kind, path));
            continue;
        }

        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                overlay(existing, incoming, &path, kind, warnings);
            },
            (Some(Value::Object(_)), _) => {
                warnings.push(format!(
                    "{} sets section \"{}\" to a plain value; ignored",
                    kind, path
                ));
            },
            _ => {
                base.insert(key.clone(), value.clone());
            },
        }
    }
}

/// The resolved, read-only configuration.
#[derive(Debug)]
pub struct ConfigStore {
    sources: Vec<ConfigSource>,
    merged: Value,
    config_file: Option<PathBuf>,
    errors: Vec<LeptonError>,
    warnings: Vec<String>,
}

impl ConfigStore {
    /// Resolved value at `path`, or `None` when no layer knows the key.
    pub fn get(&self, path: &str) -> Option<&Value> {
        sources::lookup(&self.merged, path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    /// `get_u64` narrowed to `u32`, falling back to the default layer when a
    /// higher layer supplied something that is not a non-negative integer.
    pub fn get_u32_or_default(&self, path: &str) -> Option<u32> {
        self.get_u64(path)
            .or_else(|| self.default_value(path).and_then(Value::as_u64))
            .and_then(|v| u32::try_from(v).ok())
    }

    /// `get_str` falling back to the default layer on a type mismatch.
    pub fn get_str_or_default(&self, path: &str) -> Option<&str> {
        self.get_str(path)
            .or_else(|| self.default_value(path).and_then(Value::as_str))
    }

    /// `get_bool` falling back to the default layer on a type mismatch.
    pub fn get_bool_or_default(&self, path: &str) -> Option<bool> {
        self.get_bool(path)
            .or_else(|| self.default_value(path).and_then(Value::as_bool))
    }

    fn default_value(&self, path: &str) -> Option<&Value> {
        self.sources
            .iter()
            .find(|s| s.kind == SourceKind::Defaults)
            .and_then(|s| lookup_map(&s.values, path))
    }

    /// Which layer supplied the leaf value at `path`.
    ///
    /// Sections merged from several layers have no single origin.
    pub fn origin(&self, path: &str) -> Option<SourceKind> {
        let resolved = self.get(path)?;
        if resolved.is_object() {
            return None;
        }
        self.sources
            .iter()
            .find(|source| lookup_map(&source.values, path) == Some(resolved))
            .map(|source| source.kind)
    }

    /// Layers in decreasing priority.
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Whole merged tree.
    pub fn snapshot(&self) -> &Value {
        &self.merged
    }

    /// Logger level from `logger:level`, `Info` when unset or unknown.
    pub fn log_level(&self) -> LevelFilter {
        self.get_str("logger:level")
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    }

    /// Problems met while resolving (unreadable file, rejected overlays).
    pub fn errors(&self) -> &[LeptonError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Top-level default keys with their fully resolved values, secrets
    /// redacted. Used for startup diagnostics.
    pub fn resolved_defaults(&self) -> Vec<(String, Value)> {
        let Some(defaults) = self
            .sources
            .iter()
            .find(|s| s.kind == SourceKind::Defaults)
        else {
            return Vec::new();
        };

        defaults
            .values
            .keys()
            .map(|key| {
                let value = self.get(key).cloned().unwrap_or(Value::Null);
                (key.clone(), redact(value))
            })
            .collect()
    }

    /// Log resolution problems, then every default key with its value.
    ///
    /// Called once the logger is up, since resolution runs before it.
    pub fn report(&self) {
        match &self.config_file {
            Some(path) => log::info!("[CONFIG] Looking for .leptonrc at {}", path.display()),
            None => log::info!("[CONFIG] No user config file configured"),
        }

        for err in &self.errors {
            log::error!(
                "[CONFIG] Please correct the mistakes in your configuration file: {}",
                err
            );
        }
        for warning in &self.warnings {
            log::warn!("[CONFIG] {}", warning);
        }

        log::info!("[CONFIG] The resolved configuration is ...");
        for (key, value) in self.resolved_defaults() {
            log::info!("[CONFIG] \"{}\": {}", key, value);
        }
    }
}

fn lookup_map<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let (head, rest) = match path.split_once(KEY_SEPARATOR) {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = map.get(head)?;
    match rest {
        Some(rest) => sources::lookup(value, rest),
        None => Some(value),
    }
}

const SECRET_KEYS: &[&str] = &["token"];

fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let is_secret = SECRET_KEYS.contains(&key.as_str())
                        && value.as_str().is_some_and(|s| !s.is_empty());
                    if is_secret {
                        (key, Value::String("***".to_string()))
                    } else {
                        (key, redact(value))
                    }
                })
                .collect(),
        ),
        other => other,
    }
}
