//! Glue that connects the resolver and the plugin manager to a container.

use crate::config::ManagerConfig;
use crate::container::{Container, FallbackFactory, ServiceContainer};
use crate::error::{Error, Result};
use crate::manager::PluginManager;
use crate::options::Options;
use crate::params::Overrides;
use crate::resolver::Resolver;
use crate::value::Value;
use serde_json::Value as Json;
use std::sync::{Arc, Weak};

/// Container fallback that autowires any type registered with a [`Resolver`].
///
/// Options passed to the container become resolver overrides. The factory
/// only keeps a weak handle, so a resolver that owns the container does not
/// keep itself alive through it.
///
/// ```
/// use fibre_autowire::{AutowireFactory, Container, Resolver};
/// use std::sync::Arc;
///
/// let container = Arc::new(Container::new());
/// let resolver = Arc::new(Resolver::new(container.clone()));
/// container.add_fallback(AutowireFactory::new(&resolver));
/// ```
pub struct AutowireFactory {
  resolver: Weak<Resolver>,
}

impl AutowireFactory {
  pub fn new(resolver: &Arc<Resolver>) -> Self {
    Self {
      resolver: Arc::downgrade(resolver),
    }
  }
}

impl FallbackFactory for AutowireFactory {
  fn can_create(&self, identifier: &str) -> bool {
    self
      .resolver
      .upgrade()
      .is_some_and(|resolver| resolver.is_registered(identifier))
  }

  fn create(&self, _container: &Container, identifier: &str, options: Option<&Options>) -> Result<Value> {
    let resolver = self.resolver.upgrade().ok_or(Error::ResolverDropped)?;
    let overrides = options.map(Overrides::from_options).unwrap_or_default();

    resolver
      .resolve_class(identifier, &overrides)
      .map_err(|source| Error::ServiceNotCreated {
        identifier: identifier.to_owned(),
        source: Box::new(source),
      })
  }
}

/// Builds a plugin manager from the `key` section of an application config.
/// A missing section gives an unconfigured manager.
pub fn manager_from_section(
  container: Arc<dyn ServiceContainer>,
  root: &Json,
  key: &str,
) -> Result<PluginManager> {
  let config = ManagerConfig::from_section(root, key)?;
  PluginManager::with_config(container, config).map(|manager| manager.named(key))
}
