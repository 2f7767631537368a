//! The backing service container contract and a thread-safe implementation of it.

use crate::error::{Error, Result};
use crate::options::Options;
use crate::value::Value;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;

/// What the resolver and the plugin manager need from a service container.
pub trait ServiceContainer: Send + Sync {
  /// True if `identifier` can be resolved.
  fn has(&self, identifier: &str) -> bool;

  /// Resolves `identifier`, honouring the container's own sharing policy.
  ///
  /// Passing options asks for a fresh instance built with them.
  fn get(&self, identifier: &str, options: Option<&Options>) -> Result<Value>;

  /// Always constructs a fresh instance, bypassing any cached one.
  fn build(&self, identifier: &str, options: &Options) -> Result<Value>;
}

/// A service factory. It receives the container so it can pull its own dependencies.
pub type Factory = Arc<dyn Fn(&Container, &str, Option<&Options>) -> Result<Value> + Send + Sync>;

/// A factory consulted for identifiers that have no explicit registration.
pub trait FallbackFactory: Send + Sync {
  fn can_create(&self, identifier: &str) -> bool;

  fn create(&self, container: &Container, identifier: &str, options: Option<&Options>) -> Result<Value>;
}

enum Provider {
  Shared {
    cell: OnceCell<Value>,
    factory: Option<Factory>,
  },
  Transient {
    factory: Factory,
  },
}

/// A name-keyed, thread-safe service container.
///
/// Services are shared by default: a factory added with [`Container::add_factory`]
/// runs once and every later `get` returns the same instance.
#[derive(Default)]
pub struct Container {
  providers: DashMap<String, Arc<Provider>>,
  fallbacks: RwLock<Vec<Arc<dyn FallbackFactory>>>,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- Registration ---

  pub fn add_instance(&self, identifier: impl Into<String>, instance: impl Into<Value>) {
    let provider = Provider::Shared {
      cell: OnceCell::with_value(instance.into()),
      factory: None,
    };
    self.providers.insert(identifier.into(), Arc::new(provider));
  }

  pub fn add_factory<F>(&self, identifier: impl Into<String>, factory: F)
  where
    F: Fn(&Container, &str, Option<&Options>) -> Result<Value> + Send + Sync + 'static,
  {
    let provider = Provider::Shared {
      cell: OnceCell::new(),
      factory: Some(Arc::new(factory)),
    };
    self.providers.insert(identifier.into(), Arc::new(provider));
  }

  pub fn add_transient<F>(&self, identifier: impl Into<String>, factory: F)
  where
    F: Fn(&Container, &str, Option<&Options>) -> Result<Value> + Send + Sync + 'static,
  {
    let provider = Provider::Transient {
      factory: Arc::new(factory),
    };
    self.providers.insert(identifier.into(), Arc::new(provider));
  }

  pub fn add_fallback(&self, fallback: impl FallbackFactory + 'static) {
    self.fallbacks.write().push(Arc::new(fallback));
  }

  // --- Private helpers ---

  // Clones the provider out so no map guard is held while a factory runs.
  fn provider(&self, identifier: &str) -> Option<Arc<Provider>> {
    self.providers.get(identifier).map(|entry| Arc::clone(entry.value()))
  }

  fn fallback_for(&self, identifier: &str) -> Option<Arc<dyn FallbackFactory>> {
    self
      .fallbacks
      .read()
      .iter()
      .find(|fallback| fallback.can_create(identifier))
      .cloned()
  }

  fn not_found(identifier: &str) -> Error {
    Error::ServiceNotFound {
      identifier: identifier.to_owned(),
    }
  }

  fn create(&self, identifier: &str, options: Option<&Options>) -> Result<Value> {
    match self.provider(identifier).as_deref() {
      Some(Provider::Shared {
        factory: Some(factory),
        ..
      })
      | Some(Provider::Transient { factory }) => factory(self, identifier, options),
      // A plain instance has nothing to rebuild from.
      Some(Provider::Shared { cell, factory: None }) => {
        cell.get().cloned().ok_or_else(|| Self::not_found(identifier))
      }
      None => match self.fallback_for(identifier) {
        Some(fallback) => fallback.create(self, identifier, options),
        None => Err(Self::not_found(identifier)),
      },
    }
  }

  fn get_shared(&self, identifier: &str) -> Result<Value> {
    if let Some(provider) = self.provider(identifier) {
      return match provider.as_ref() {
        Provider::Shared { cell, factory } => cell
          .get_or_try_init(|| match factory {
            Some(factory) => factory(self, identifier, None),
            None => Err(Self::not_found(identifier)),
          })
          .cloned(),
        Provider::Transient { factory } => factory(self, identifier, None),
      };
    }

    let fallback = self
      .fallback_for(identifier)
      .ok_or_else(|| Self::not_found(identifier))?;
    tracing::trace!(service = identifier, "resolving through fallback factory");
    let instance = fallback.create(self, identifier, None)?;

    // First fallback build to land wins; later racers get the stored one.
    let stored = self
      .providers
      .entry(identifier.to_owned())
      .or_insert_with(|| {
        Arc::new(Provider::Shared {
          cell: OnceCell::with_value(instance.clone()),
          factory: None,
        })
      })
      .value()
      .clone();
    match stored.as_ref() {
      Provider::Shared { cell, .. } => Ok(cell.get().cloned().unwrap_or(instance)),
      Provider::Transient { .. } => Ok(instance),
    }
  }
}

impl ServiceContainer for Container {
  fn has(&self, identifier: &str) -> bool {
    self.providers.contains_key(identifier) || self.fallback_for(identifier).is_some()
  }

  fn get(&self, identifier: &str, options: Option<&Options>) -> Result<Value> {
    match options {
      Some(options) if !options.is_empty() => self.create(identifier, Some(options)),
      _ => self.get_shared(identifier),
    }
  }

  fn build(&self, identifier: &str, options: &Options) -> Result<Value> {
    self.create(identifier, Some(options))
  }
}
