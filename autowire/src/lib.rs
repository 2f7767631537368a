//! # Fibre Autowire
//!
//! Rule-based autowiring and a configuration-driven plugin manager, layered
//! over a thread-safe service container.
//!
//! ## Core Concepts
//!
//! - **Container**: a name-keyed service container, shared-by-default, with
//!   fallback factories for names it has no explicit registration for.
//! - **Resolver**: builds types and calls functions by resolving each declared
//!   parameter from call overrides, registered rules, the container, or the
//!   parameter's default, in that order.
//! - **Rules**: per-type parameter values registered ahead of time with
//!   `resolver.when(target).needs(param).give(value)`.
//! - **PluginManager**: named services declared in configuration, built once
//!   with merged options and cached.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_autowire::{options, Container, ManagerConfig, PluginManager, Value};
//! use std::sync::Arc;
//!
//! let container = Arc::new(Container::new());
//! container.add_factory("smtp", |_, _, options| {
//!   let host = options
//!     .and_then(|o| o.get("host"))
//!     .and_then(|h| h.as_str())
//!     .unwrap_or("localhost");
//!   Ok(Value::from(format!("smtp://{host}")))
//! });
//!
//! let config = ManagerConfig::from_yaml_str(
//!   r#"
//! default: mailer
//! default_options:
//!   host: mail.internal
//! plugins:
//!   mailer:
//!     service: smtp
//! "#,
//! )
//! .unwrap();
//!
//! let manager = PluginManager::with_config(container, config).unwrap();
//! let mailer = manager.get_default().unwrap();
//! assert_eq!(mailer.downcast_ref::<String>().unwrap(), "smtp://mail.internal");
//! ```

mod config;
mod container;
mod core;
mod error;
mod factory;
mod macros;
mod manager;
pub mod options;
mod params;
mod resolver;
mod rules;
mod value;

pub use config::{ManagerConfig, PluginSpec};
pub use container::{Container, Factory, FallbackFactory, ServiceContainer};
pub use crate::core::{Autowire, Function, Method, INVOKE};
pub use error::{Error, Result};
pub use factory::{manager_from_section, AutowireFactory};
pub use manager::{AcceptAll, InstanceOf, PluginManager, PluginValidator};
pub use options::Options;
pub use params::{Arguments, Kind, Overrides, Parameter};
pub use resolver::{Callable, Resolver};
pub use rules::{RuleBuilder, RuleTable};
pub use value::{Provided, Value};

#[doc(hidden)]
pub use serde_json;
