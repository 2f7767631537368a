//! Parameter descriptors and the argument lists assembled from them.

use crate::core::Autowire;
use crate::error::{Error, Result};
use crate::options::{json_to_value, Options};
use crate::value::{Provided, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// The declared kind of a parameter.
///
/// Everything except `Service` is a primitive kind and is never looked up
/// in the backing container, even if a service happens to share its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
  String,
  Integer,
  Float,
  Boolean,
  Sequence,
  Untyped,
  /// A service, identified the way the backing container knows it.
  Service(String),
}

impl Kind {
  pub fn is_primitive(&self) -> bool {
    !matches!(self, Kind::Service(_))
  }

  pub(crate) fn service_identifier(&self) -> Option<&str> {
    match self {
      Kind::Service(id) => Some(id),
      _ => None,
    }
  }
}

/// One entry of a constructor's or function's parameter list.
#[derive(Debug, Clone)]
pub struct Parameter {
  name: String,
  kind: Kind,
  default: Option<Value>,
}

impl Parameter {
  pub fn new(name: impl Into<String>, kind: Kind) -> Self {
    Self {
      name: name.into(),
      kind,
      default: None,
    }
  }

  pub fn string(name: impl Into<String>) -> Self {
    Self::new(name, Kind::String)
  }

  pub fn integer(name: impl Into<String>) -> Self {
    Self::new(name, Kind::Integer)
  }

  pub fn float(name: impl Into<String>) -> Self {
    Self::new(name, Kind::Float)
  }

  pub fn boolean(name: impl Into<String>) -> Self {
    Self::new(name, Kind::Boolean)
  }

  pub fn sequence(name: impl Into<String>) -> Self {
    Self::new(name, Kind::Sequence)
  }

  pub fn untyped(name: impl Into<String>) -> Self {
    Self::new(name, Kind::Untyped)
  }

  /// A parameter satisfied by the container service registered under `T`'s identifier.
  pub fn service<T: Autowire>(name: impl Into<String>) -> Self {
    Self::new(name, Kind::Service(T::identifier().to_owned()))
  }

  /// A parameter satisfied by the container service registered under `identifier`.
  pub fn service_id(name: impl Into<String>, identifier: impl Into<String>) -> Self {
    Self::new(name, Kind::Service(identifier.into()))
  }

  pub fn with_default(mut self, value: impl Into<Value>) -> Self {
    self.default = Some(value.into());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> &Kind {
    &self.kind
  }

  pub fn default_value(&self) -> Option<&Value> {
    self.default.as_ref()
  }
}

/// Caller-supplied values for one resolution, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  values: HashMap<String, Provided>,
}

impl Overrides {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, parameter: impl Into<String>, value: impl Into<Provided>) -> Self {
    self.insert(parameter, value);
    self
  }

  pub fn lazy<F>(self, parameter: impl Into<String>, provider: F) -> Self
  where
    F: Fn() -> Value + Send + Sync + 'static,
  {
    self.with(parameter, Provided::lazy(provider))
  }

  pub fn insert(&mut self, parameter: impl Into<String>, value: impl Into<Provided>) {
    self.values.insert(parameter.into(), value.into());
  }

  /// Builds overrides from a factory's option map, one entry per option.
  pub fn from_options(options: &Options) -> Self {
    let values = options
      .iter()
      .map(|(key, json)| (key.clone(), Provided::Literal(json_to_value(json))))
      .collect();
    Self { values }
  }

  pub fn get(&self, parameter: &str) -> Option<&Provided> {
    self.values.get(parameter)
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// The resolved, positional argument list handed to a constructor or function.
///
/// Arguments keep declaration order, but are normally read back by name.
#[derive(Debug, Clone)]
pub struct Arguments {
  target: String,
  entries: Vec<(String, Value)>,
}

impl Arguments {
  pub(crate) fn new(target: impl Into<String>, entries: Vec<(String, Value)>) -> Self {
    Self {
      target: target.into(),
      entries,
    }
  }

  /// The type or callable these arguments were resolved for.
  pub fn target(&self) -> &str {
    &self.target
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn at(&self, position: usize) -> Option<&Value> {
    self.entries.get(position).map(|(_, value)| value)
  }

  pub fn value(&self, parameter: &str) -> Result<&Value> {
    self
      .entries
      .iter()
      .find(|(name, _)| name == parameter)
      .map(|(_, value)| value)
      .ok_or_else(|| Error::UnresolvedParameter {
        parameter: parameter.to_owned(),
        target: self.target.clone(),
      })
  }

  pub fn get<T: Any + Send + Sync>(&self, parameter: &str) -> Result<Arc<T>> {
    self
      .value(parameter)?
      .downcast::<T>()
      .ok_or_else(|| Self::mismatch::<T>(parameter))
  }

  pub fn cloned<T: Any + Send + Sync + Clone>(&self, parameter: &str) -> Result<T> {
    self
      .value(parameter)?
      .downcast_ref::<T>()
      .cloned()
      .ok_or_else(|| Self::mismatch::<T>(parameter))
  }

  /// Reads back a trait-object service argument.
  pub fn service<I: ?Sized + Any + Send + Sync>(&self, parameter: &str) -> Result<Arc<I>> {
    self
      .value(parameter)?
      .service::<I>()
      .ok_or_else(|| Self::mismatch::<Arc<I>>(parameter))
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.entries.iter().map(|(name, value)| (name.as_str(), value))
  }

  fn mismatch<T: ?Sized>(parameter: &str) -> Error {
    Error::ArgumentType {
      parameter: parameter.to_owned(),
      expected: std::any::type_name::<T>(),
    }
  }
}
