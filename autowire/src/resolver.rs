//! Rule-based autowiring of constructors, methods and functions.

use crate::container::ServiceContainer;
use crate::core::{Autowire, ErasedMethod, Function, TypeEntry, INVOKE};
use crate::error::{Error, Result};
use crate::params::{Arguments, Overrides, Parameter};
use crate::rules::{RuleBuilder, RuleTable};
use crate::value::{Provided, Value};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Something [`Resolver::call`] can invoke.
#[derive(Debug, Clone)]
pub enum Callable {
  /// A free-standing function.
  Function(Function),
  /// A method on an already built instance of a registered type.
  Method { instance: Value, method: String },
  /// `"Type@method"`, or just `"Type"` for its `invoke` method. The type is
  /// constructed first with the same overrides.
  Path(String),
}

impl Callable {
  pub fn method(instance: Value, method: impl Into<String>) -> Self {
    Callable::Method {
      instance,
      method: method.into(),
    }
  }
}

impl From<Function> for Callable {
  fn from(function: Function) -> Self {
    Callable::Function(function)
  }
}

impl From<&str> for Callable {
  fn from(path: &str) -> Self {
    Callable::Path(path.to_owned())
  }
}

impl From<String> for Callable {
  fn from(path: String) -> Self {
    Callable::Path(path)
  }
}

impl From<(Value, &str)> for Callable {
  fn from((instance, method): (Value, &str)) -> Self {
    Callable::method(instance, method)
  }
}

fn split_path(path: &str) -> (&str, &str) {
  let mut parts = path.split('@');
  let identifier = parts.next().unwrap_or(path);
  match parts.next() {
    Some(method) if !method.is_empty() => (identifier, method),
    _ => (identifier, INVOKE),
  }
}

/// Builds objects and calls functions by resolving each declared parameter.
///
/// A parameter takes the first value found, in this order:
///
/// 1. an override passed to the call,
/// 2. a rule registered for (target, parameter),
/// 3. the container service named by the parameter's declared service kind,
/// 4. the parameter's declared default.
///
/// Functions and methods have no target identifier, so step 2 never
/// applies to their own parameters.
pub struct Resolver {
  container: Arc<dyn ServiceContainer>,
  rules: RuleTable,
  types: DashMap<String, Arc<TypeEntry>>,
  identifiers: DashMap<TypeId, String>,
}

impl Resolver {
  pub fn new(container: Arc<dyn ServiceContainer>) -> Self {
    Self {
      container,
      rules: RuleTable::new(),
      types: DashMap::new(),
      identifiers: DashMap::new(),
    }
  }

  pub fn container(&self) -> &Arc<dyn ServiceContainer> {
    &self.container
  }

  pub fn rules(&self) -> &RuleTable {
    &self.rules
  }

  // --- Type registration ---

  /// Makes `T` reachable by its identifier for `resolve_class` and `call`.
  pub fn register<T: Autowire>(&self) -> &Self {
    let entry = TypeEntry::of::<T>();
    self
      .identifiers
      .insert(TypeId::of::<T>(), entry.identifier.to_owned());
    self.types.insert(entry.identifier.to_owned(), Arc::new(entry));
    self
  }

  pub fn is_registered(&self, identifier: &str) -> bool {
    self.types.contains_key(identifier)
  }

  // --- Rules ---

  pub fn when(&self, target: impl Into<String>) -> RuleBuilder<'_> {
    RuleBuilder::new(target, self)
  }

  pub fn add_service_rule(&self, target: &str, parameter: &str, value: impl Into<Provided>) {
    tracing::trace!(target_id = target, parameter, "registering rule");
    self.rules.insert(target, parameter, value.into());
  }

  // --- Resolution ---

  /// Constructs the registered type `identifier`.
  pub fn resolve_class(&self, identifier: &str, overrides: &Overrides) -> Result<Value> {
    let entry = self.entry(identifier)?;
    self.construct(&entry, overrides)
  }

  /// Constructs `T` directly; `T` does not need to be registered.
  pub fn make<T: Autowire>(&self, overrides: &Overrides) -> Result<Arc<T>> {
    let identifier = T::identifier();
    let args = self.resolve_arguments(Some(identifier), identifier, &T::parameters(), overrides)?;
    T::construct(args).map(Arc::new)
  }

  pub fn call(&self, callable: impl Into<Callable>, overrides: &Overrides) -> Result<Value> {
    match callable.into() {
      Callable::Function(function) => {
        let args = self.resolve_arguments(None, function.name(), function.parameters(), overrides)?;
        function.invoke(args)
      }
      Callable::Method { instance, method } => {
        let entry = self.entry_of(&instance)?;
        let erased = entry.method(&method)?;
        self.invoke(&entry, &erased, &method, &instance, overrides)
      }
      Callable::Path(path) => {
        let (identifier, method) = split_path(&path);
        let entry = self.entry(identifier)?;
        // Fail on an unknown method before paying for construction.
        let erased = entry.method(method)?;
        let instance = self.construct(&entry, overrides)?;
        self.invoke(&entry, &erased, method, &instance, overrides)
      }
    }
  }

  // --- Private helpers ---

  fn entry(&self, identifier: &str) -> Result<Arc<TypeEntry>> {
    self
      .types
      .get(identifier)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or_else(|| Error::UnknownType {
        identifier: identifier.to_owned(),
      })
  }

  fn entry_of(&self, instance: &Value) -> Result<Arc<TypeEntry>> {
    let identifier = self
      .identifiers
      .get(&instance.stored_type_id())
      .map(|id| id.value().clone())
      .ok_or_else(|| Error::UnknownType {
        identifier: instance.type_name().to_owned(),
      })?;
    self.entry(&identifier)
  }

  fn construct(&self, entry: &TypeEntry, overrides: &Overrides) -> Result<Value> {
    let identifier = entry.identifier;
    if entry.parameters.is_empty() {
      return entry.construct(Arguments::new(identifier, Vec::new()));
    }
    let args = self.resolve_arguments(Some(identifier), identifier, &entry.parameters, overrides)?;
    entry.construct(args)
  }

  fn invoke(
    &self,
    entry: &TypeEntry,
    method: &ErasedMethod,
    method_name: &str,
    instance: &Value,
    overrides: &Overrides,
  ) -> Result<Value> {
    let context = format!("{}@{}", entry.identifier, method_name);
    let args = self.resolve_arguments(None, &context, &method.parameters, overrides)?;
    method.invoke(instance, args)
  }

  fn resolve_arguments(
    &self,
    rule_target: Option<&str>,
    context: &str,
    parameters: &[Parameter],
    overrides: &Overrides,
  ) -> Result<Arguments> {
    let entries = parameters
      .iter()
      .map(|parameter| {
        let value = self.resolve_parameter(rule_target, context, parameter, overrides)?;
        Ok((parameter.name().to_owned(), value))
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Arguments::new(context, entries))
  }

  fn resolve_parameter(
    &self,
    rule_target: Option<&str>,
    context: &str,
    parameter: &Parameter,
    overrides: &Overrides,
  ) -> Result<Value> {
    let name = parameter.name();

    if let Some(provided) = overrides.get(name) {
      tracing::trace!(target_id = context, parameter = name, "using override");
      return Ok(provided.evaluate());
    }

    if let Some(rule) = rule_target.and_then(|target| self.rules.get(target, name)) {
      tracing::trace!(target_id = context, parameter = name, "using rule");
      return Ok(rule.evaluate());
    }

    // Primitive kinds never reach the container.
    if let Some(service) = parameter.kind().service_identifier() {
      if self.container.has(service) {
        tracing::trace!(target_id = context, parameter = name, service, "using container");
        return self.container.get(service, None);
      }
    }

    if let Some(default) = parameter.default_value() {
      return Ok(default.clone());
    }

    Err(Error::UnresolvedParameter {
      parameter: name.to_owned(),
      target: context.to_owned(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::split_path;

  #[test]
  fn path_without_method_uses_invoke() {
    assert_eq!(split_path("Mailer"), ("Mailer", "invoke"));
    assert_eq!(split_path("Mailer@"), ("Mailer", "invoke"));
    assert_eq!(split_path("Mailer@send"), ("Mailer", "send"));
    assert_eq!(split_path("Mailer@send@extra"), ("Mailer", "send"));
  }
}
