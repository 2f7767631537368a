//! Type description: how a type declares its constructor and methods to the resolver.

use crate::error::{Error, Result};
use crate::params::{Arguments, Parameter};
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the method used when `call` is given a bare type identifier.
pub const INVOKE: &str = "invoke";

/// A type the resolver can construct by describing its own parameters.
///
/// This is the hand-written stand-in for runtime reflection: `parameters`
/// lists the constructor parameters in declaration order and `construct`
/// receives them resolved in that same order.
///
/// ```
/// use fibre_autowire::{Arguments, Autowire, Parameter, Result};
///
/// struct Mailer {
///   host: String,
///   port: i64,
/// }
///
/// impl Autowire for Mailer {
///   fn parameters() -> Vec<Parameter> {
///     vec![
///       Parameter::string("host"),
///       Parameter::integer("port").with_default(25),
///     ]
///   }
///
///   fn construct(args: Arguments) -> Result<Self> {
///     Ok(Mailer {
///       host: args.cloned("host")?,
///       port: args.cloned("port")?,
///     })
///   }
/// }
/// ```
pub trait Autowire: Any + Send + Sync + Sized {
  /// The target identifier used for rules and container lookups.
  fn identifier() -> &'static str {
    std::any::type_name::<Self>()
  }

  /// Constructor parameters. Empty means the type is built with no arguments.
  fn parameters() -> Vec<Parameter> {
    Vec::new()
  }

  fn construct(args: Arguments) -> Result<Self>;

  /// Methods reachable through `Resolver::call`.
  fn methods() -> Vec<Method<Self>> {
    Vec::new()
  }
}

type MethodBody<T> = Arc<dyn Fn(&T, Arguments) -> Result<Value> + Send + Sync>;

/// A method of `T` with its own parameter list.
pub struct Method<T> {
  name: String,
  parameters: Vec<Parameter>,
  body: MethodBody<T>,
}

impl<T: Autowire> Method<T> {
  pub fn new<F>(name: impl Into<String>, parameters: Vec<Parameter>, body: F) -> Self
  where
    F: Fn(&T, Arguments) -> Result<Value> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      parameters,
      body: Arc::new(body),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  fn erase(self) -> (String, ErasedMethod) {
    let body = self.body;
    let invoke = move |instance: &Value, args: Arguments| {
      let this = instance
        .downcast_ref::<T>()
        .ok_or_else(|| Error::ArgumentType {
          parameter: "self".to_owned(),
          expected: std::any::type_name::<T>(),
        })?;
      body(this, args)
    };
    (
      self.name,
      ErasedMethod {
        parameters: self.parameters,
        invoke: Arc::new(invoke),
      },
    )
  }
}

type FunctionBody = Arc<dyn Fn(Arguments) -> Result<Value> + Send + Sync>;

/// A free-standing invocable with a declared parameter list.
#[derive(Clone)]
pub struct Function {
  name: String,
  parameters: Vec<Parameter>,
  body: FunctionBody,
}

impl Function {
  pub fn new<F>(name: impl Into<String>, parameters: Vec<Parameter>, body: F) -> Self
  where
    F: Fn(Arguments) -> Result<Value> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      parameters,
      body: Arc::new(body),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub(crate) fn invoke(&self, args: Arguments) -> Result<Value> {
    (self.body)(args)
  }
}

impl fmt::Debug for Function {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Function")
      .field("name", &self.name)
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}

// --- Erased descriptors kept by the resolver ---

type Constructor = Arc<dyn Fn(Arguments) -> Result<Value> + Send + Sync>;
type ErasedBody = Arc<dyn Fn(&Value, Arguments) -> Result<Value> + Send + Sync>;

pub(crate) struct ErasedMethod {
  pub(crate) parameters: Vec<Parameter>,
  invoke: ErasedBody,
}

impl ErasedMethod {
  pub(crate) fn invoke(&self, instance: &Value, args: Arguments) -> Result<Value> {
    (self.invoke)(instance, args)
  }
}

/// Everything the resolver knows about a registered type, with `T` erased.
pub(crate) struct TypeEntry {
  pub(crate) identifier: &'static str,
  pub(crate) parameters: Vec<Parameter>,
  construct: Constructor,
  methods: HashMap<String, Arc<ErasedMethod>>,
}

impl TypeEntry {
  pub(crate) fn of<T: Autowire>() -> Self {
    let methods = T::methods()
      .into_iter()
      .map(|method| {
        let (name, erased) = method.erase();
        (name, Arc::new(erased))
      })
      .collect();
    Self {
      identifier: T::identifier(),
      parameters: T::parameters(),
      construct: Arc::new(|args| T::construct(args).map(Value::new)),
      methods,
    }
  }

  pub(crate) fn construct(&self, args: Arguments) -> Result<Value> {
    (self.construct)(args)
  }

  pub(crate) fn method(&self, name: &str) -> Result<Arc<ErasedMethod>> {
    self
      .methods
      .get(name)
      .cloned()
      .ok_or_else(|| Error::UnknownMethod {
        target: self.identifier.to_owned(),
        method: name.to_owned(),
      })
  }
}
