//! Plugin manager configuration: what gets deserialized, and what a plugin entry means.

use crate::error::{Error, Result};
use crate::options::Options;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Declarative configuration consumed by `PluginManager::configure`.
///
/// ```yaml
/// default: cache
/// default_options:
///   ttl: 60
/// plugins:
///   cache:                # explicit form
///     service: redis
///     options:
///       host: localhost
///   memory:               # abbreviated form: the name is the service
///     capacity: 1000
/// ```
///
/// Unknown top-level keys are ignored, since the same section often carries
/// container configuration too.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ManagerConfig {
  #[serde(default)]
  pub default: Option<String>,
  #[serde(default)]
  pub default_options: Options,
  #[serde(default)]
  pub plugins: BTreeMap<String, Options>,
}

impl ManagerConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self> {
    serde_yaml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  pub fn from_json_str(source: &str) -> Result<Self> {
    serde_json::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  /// Reads a YAML (or JSON, which YAML accepts) configuration file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let source = fs::read_to_string(path.as_ref())?;
    Self::from_yaml_str(&source)
  }

  /// Pulls the manager configuration out of `key` in a larger application config.
  /// A missing key yields an empty configuration.
  pub fn from_section(root: &Json, key: &str) -> Result<Self> {
    match root.get(key) {
      Some(section) => {
        Self::deserialize(section).map_err(|e| Error::ConfigParse(format!("section '{}': {}", key, e)))
      }
      None => Ok(Self::default()),
    }
  }
}

/// A plugin entry after interpretation: which service to build, with which options.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSpec {
  pub service: String,
  pub options: Options,
}

impl PluginSpec {
  pub fn new(service: impl Into<String>, options: Options) -> Self {
    Self {
      service: service.into(),
      options,
    }
  }

  /// Interprets one raw `plugins` entry.
  ///
  /// A `service` key always means explicit form, `{service, options?}`.
  /// Anything else is abbreviated form: `name` is the service and the whole
  /// entry is its option map.
  pub fn from_entry(name: &str, entry: &Options) -> Result<Self> {
    let Some(service) = entry.get("service") else {
      return Ok(Self::new(name, entry.clone()));
    };

    let service = match service {
      Json::String(s) if !s.is_empty() => s.clone(),
      _ => {
        return Err(Error::InvalidConfig {
          field: format!("plugins.{}.service", name),
          message: "must be a non-empty string".to_owned(),
        })
      }
    };

    let options = match entry.get("options") {
      None | Some(Json::Null) => Options::new(),
      Some(Json::Object(options)) => options.clone(),
      Some(_) => {
        return Err(Error::InvalidConfig {
          field: format!("plugins.{}.options", name),
          message: "must be a map".to_owned(),
        })
      }
    };

    Ok(Self::new(service, options))
  }
}
