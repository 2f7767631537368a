use thiserror::Error;

/// The error type for resolver, container and plugin manager operations.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Options for the plugin \"{name}\" were not found in the plugins configuration")]
  UnknownPlugin { name: String },

  #[error("Invalid default configured for plugin manager {manager}")]
  InvalidDefault { manager: String },

  #[error("Unable to resolve parameter \"{parameter}\" of {target}")]
  UnresolvedParameter { parameter: String, target: String },

  #[error("Plugin \"{name}\" was rejected by the manager: {reason}")]
  ValidationRejected { name: String, reason: String },

  #[error("Service \"{identifier}\" was not found in the container")]
  ServiceNotFound { identifier: String },

  #[error("Unable to create service \"{identifier}\": {source}")]
  ServiceNotCreated {
    identifier: String,
    #[source]
    source: Box<Error>,
  },

  #[error("Type \"{identifier}\" is not registered with the resolver")]
  UnknownType { identifier: String },

  #[error("Type \"{target}\" has no method \"{method}\"")]
  UnknownMethod { target: String, method: String },

  #[error("Argument \"{parameter}\" is not of the expected type {expected}")]
  ArgumentType {
    parameter: String,
    expected: &'static str,
  },

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidConfig { field: String, message: String },

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Factory failed: {0}")]
  Factory(String),

  #[error("The resolver backing this factory has been dropped")]
  ResolverDropped,
}

impl Error {
  /// Convenience for user factories that want to fail with a plain message.
  pub fn factory(message: impl Into<String>) -> Self {
    Error::Factory(message.into())
  }
}

/// A specialized `Result` type for `fibre_autowire` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
