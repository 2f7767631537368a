//! Per-target parameter rules and the fluent builder that registers them.

use crate::resolver::Resolver;
use crate::value::Provided;
use dashmap::DashMap;
use std::collections::HashMap;

/// Rules keyed by target identifier, then by parameter name.
///
/// A later rule for the same (target, parameter) replaces the earlier one.
/// There is no removal.
#[derive(Debug, Default)]
pub struct RuleTable {
  rules: DashMap<String, HashMap<String, Provided>>,
}

impl RuleTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&self, target: &str, parameter: &str, value: Provided) {
    self
      .rules
      .entry(target.to_owned())
      .or_default()
      .insert(parameter.to_owned(), value);
  }

  /// Returns a copy of the rule so the caller can evaluate it without holding a lock.
  pub fn get(&self, target: &str, parameter: &str) -> Option<Provided> {
    self
      .rules
      .get(target)
      .and_then(|params| params.get(parameter).cloned())
  }

  pub fn contains(&self, target: &str, parameter: &str) -> bool {
    self
      .rules
      .get(target)
      .is_some_and(|params| params.contains_key(parameter))
  }
}

/// Registers rules for one target: `resolver.when(target).needs(param).give(value)`.
pub struct RuleBuilder<'r> {
  target: String,
  parameter: Option<String>,
  resolver: &'r Resolver,
}

impl<'r> RuleBuilder<'r> {
  pub(crate) fn new(target: impl Into<String>, resolver: &'r Resolver) -> Self {
    Self {
      target: target.into(),
      parameter: None,
      resolver,
    }
  }

  pub fn needs(mut self, parameter: impl Into<String>) -> Self {
    self.parameter = Some(parameter.into());
    self
  }

  /// Registers the value for the parameter named by the last `needs`.
  /// Does nothing if `needs` was never called.
  pub fn give(self, value: impl Into<Provided>) -> Self {
    if let Some(parameter) = &self.parameter {
      self.resolver.add_service_rule(&self.target, parameter, value);
    }
    self
  }

  pub fn target(&self) -> &str {
    &self.target
  }
}
