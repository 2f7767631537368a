//! The plugin manager: named, configured, cached services over a backing container.

use crate::config::{ManagerConfig, PluginSpec};
use crate::container::ServiceContainer;
use crate::error::{Error, Result};
use crate::options::{merge, Options};
use crate::value::Value;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Checks that a freshly built plugin has the shape the manager hands out.
pub trait PluginValidator: Send + Sync {
  fn validate(&self, plugin: &Value) -> std::result::Result<(), String>;
}

impl<F> PluginValidator for F
where
  F: Fn(&Value) -> std::result::Result<(), String> + Send + Sync,
{
  fn validate(&self, plugin: &Value) -> std::result::Result<(), String> {
    self(plugin)
  }
}

/// Accepts every plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl PluginValidator for AcceptAll {
  fn validate(&self, _plugin: &Value) -> std::result::Result<(), String> {
    Ok(())
  }
}

/// Accepts plugins whose stored type is exactly `T`.
///
/// For trait-object plugins stored with `Value::from_service`, use
/// `InstanceOf<Arc<dyn Trait>>`.
pub struct InstanceOf<T: ?Sized>(PhantomData<fn() -> Box<T>>);

impl<T: ?Sized> InstanceOf<T> {
  pub fn new() -> Self {
    Self(PhantomData)
  }
}

impl<T: ?Sized> Default for InstanceOf<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Any> PluginValidator for InstanceOf<T> {
  fn validate(&self, plugin: &Value) -> std::result::Result<(), String> {
    if plugin.is::<T>() {
      Ok(())
    } else {
      Err(format!(
        "expected an instance of {}, got {}",
        std::any::type_name::<T>(),
        plugin.type_name()
      ))
    }
  }
}

/// A name-keyed overlay over a [`ServiceContainer`].
///
/// Names declared under `plugins` are built once through the container's
/// `build`, with the manager's default options overlaid by the plugin's own,
/// and cached for the manager's lifetime. Any other name falls through to the
/// container's own `get`.
pub struct PluginManager {
  name: String,
  container: Arc<dyn ServiceContainer>,
  plugins: RwLock<HashMap<String, PluginSpec>>,
  default_options: RwLock<Options>,
  default: RwLock<Option<String>>,
  built: DashMap<String, Arc<OnceCell<Value>>>,
  validator: Box<dyn PluginValidator>,
}

impl PluginManager {
  pub fn new(container: Arc<dyn ServiceContainer>) -> Self {
    Self {
      name: "PluginManager".to_owned(),
      container,
      plugins: RwLock::new(HashMap::new()),
      default_options: RwLock::new(Options::new()),
      default: RwLock::new(None),
      built: DashMap::new(),
      validator: Box::new(AcceptAll),
    }
  }

  pub fn with_config(container: Arc<dyn ServiceContainer>, config: ManagerConfig) -> Result<Self> {
    let manager = Self::new(container);
    manager.configure(config)?;
    Ok(manager)
  }

  /// Name used in error messages, e.g. "cache manager".
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn with_validator(mut self, validator: impl PluginValidator + 'static) -> Self {
    self.validator = Box::new(validator);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Applies configuration on top of what is already there.
  ///
  /// Plugins are applied first, so `default` may name a plugin from the same
  /// configuration. Keys absent from `config` keep their previous values.
  pub fn configure(&self, config: ManagerConfig) -> Result<()> {
    let specs = config
      .plugins
      .iter()
      .map(|(name, entry)| Ok((name.clone(), PluginSpec::from_entry(name, entry)?)))
      .collect::<Result<Vec<_>>>()?;
    self.plugins.write().extend(specs);

    if let Some(default) = config.default {
      self.set_default(default)?;
    }

    if !config.default_options.is_empty() {
      self.default_options.write().extend(config.default_options);
    }

    tracing::debug!(manager = %self.name, "configured");
    Ok(())
  }

  /// Declares or replaces one plugin.
  pub fn add_plugin(&self, name: impl Into<String>, spec: PluginSpec) {
    self.plugins.write().insert(name.into(), spec);
  }

  pub fn has_plugin(&self, name: &str) -> bool {
    self.plugins.read().contains_key(name)
  }

  pub fn has(&self, name: &str) -> bool {
    self.container.has(name) || self.has_plugin(name)
  }

  /// Returns the plugin `name`, building and caching it on first use.
  ///
  /// Concurrent first calls for the same name build it once.
  pub fn get_plugin(&self, name: &str) -> Result<Value> {
    if let Some(cached) = self.cached(name) {
      tracing::trace!(manager = %self.name, plugin = name, "plugin cache hit");
      return Ok(cached);
    }

    let spec = self.plugin_spec(name)?;
    let slot = self
      .built
      .entry(name.to_owned())
      .or_default()
      .value()
      .clone();

    slot.get_or_try_init(|| self.build_plugin(name, &spec)).cloned()
  }

  /// Resolves `name`: configured plugins win unless per-call options are given,
  /// in which case the backing container builds it directly.
  pub fn get(&self, name: &str, options: Option<&Options>) -> Result<Value> {
    let has_options = options.is_some_and(|options| !options.is_empty());
    if !has_options && self.has_plugin(name) {
      return self.get_plugin(name);
    }

    tracing::trace!(manager = %self.name, service = name, "delegating to container");
    self.container.get(name, options)
  }

  pub fn get_default(&self) -> Result<Value> {
    let default = self.default.read().clone();
    match default {
      Some(name) if self.has_plugin(&name) => self.get(&name, None),
      _ => Err(Error::InvalidDefault {
        manager: self.name.clone(),
      }),
    }
  }

  pub fn set_default(&self, name: impl Into<String>) -> Result<()> {
    let name = name.into();
    if !self.has_plugin(&name) {
      return Err(Error::UnknownPlugin { name });
    }
    *self.default.write() = Some(name);
    Ok(())
  }

  pub fn default_name(&self) -> Option<String> {
    self.default.read().clone()
  }

  // --- Private helpers ---

  fn cached(&self, name: &str) -> Option<Value> {
    self.built.get(name).and_then(|slot| slot.get().cloned())
  }

  fn plugin_spec(&self, name: &str) -> Result<PluginSpec> {
    self
      .plugins
      .read()
      .get(name)
      .cloned()
      .ok_or_else(|| Error::UnknownPlugin {
        name: name.to_owned(),
      })
  }

  fn build_plugin(&self, name: &str, spec: &PluginSpec) -> Result<Value> {
    let options = merge(&self.default_options.read(), &spec.options);
    tracing::debug!(
      manager = %self.name,
      plugin = name,
      service = %spec.service,
      "building plugin"
    );

    let plugin = self.container.build(&spec.service, &options)?;
    self
      .validator
      .validate(&plugin)
      .map_err(|reason| Error::ValidationRejected {
        name: name.to_owned(),
        reason,
      })?;
    Ok(plugin)
  }
}

impl ServiceContainer for PluginManager {
  fn has(&self, identifier: &str) -> bool {
    PluginManager::has(self, identifier)
  }

  fn get(&self, identifier: &str, options: Option<&Options>) -> Result<Value> {
    PluginManager::get(self, identifier, options)
  }

  fn build(&self, identifier: &str, options: &Options) -> Result<Value> {
    self.container.build(identifier, options)
  }
}
