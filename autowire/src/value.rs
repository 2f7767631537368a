//! Type-erased values passed between the container, the resolver and user code.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased value.
///
/// Services, constructor arguments and call results all travel as `Value`.
/// Cloning is cheap and preserves identity, so two clones of the same value
/// compare equal under [`Value::ptr_eq`].
#[derive(Clone)]
pub struct Value {
  inner: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Value {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self {
      inner: Arc::new(value),
      type_name: std::any::type_name::<T>(),
    }
  }

  /// Wraps an existing `Arc` without re-allocating, keeping its identity.
  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      inner: value,
      type_name: std::any::type_name::<T>(),
    }
  }

  /// Stores a trait object. Read it back with [`Value::service`].
  pub fn from_service<I: ?Sized + Any + Send + Sync>(service: Arc<I>) -> Self {
    Self::new(service)
  }

  pub fn is<T: Any>(&self) -> bool {
    self.stored_type_id() == TypeId::of::<T>()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.inner.downcast_ref::<T>()
  }

  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.inner.clone().downcast::<T>().ok()
  }

  /// Reads back a trait object stored with [`Value::from_service`].
  pub fn service<I: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<I>> {
    self.downcast_ref::<Arc<I>>().cloned()
  }

  /// True if both values point at the same allocation.
  pub fn ptr_eq(&self, other: &Value) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub(crate) fn stored_type_id(&self) -> TypeId {
    // Deref first, otherwise this would be the TypeId of the Arc itself.
    Any::type_id(&*self.inner)
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(s) = self.downcast_ref::<String>() {
      return write!(f, "Value({:?})", s);
    }
    if let Some(i) = self.downcast_ref::<i64>() {
      return write!(f, "Value({})", i);
    }
    if let Some(b) = self.downcast_ref::<bool>() {
      return write!(f, "Value({})", b);
    }
    write!(f, "Value(<{}>)", self.type_name)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::new(value.to_owned())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::new(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::new(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Value::new(i64::from(value))
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::new(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::new(value)
  }
}

impl From<Vec<Value>> for Value {
  fn from(value: Vec<Value>) -> Self {
    Value::new(value)
  }
}

impl From<serde_json::Value> for Value {
  fn from(value: serde_json::Value) -> Self {
    crate::options::json_to_value(&value)
  }
}

type Deferred = Arc<dyn Fn() -> Value + Send + Sync>;

/// Either a ready value or a zero-argument provider evaluated at resolution time.
///
/// A deferred provider runs once per resolution that needs it; its result is
/// never cached between resolutions.
#[derive(Clone)]
pub enum Provided {
  Literal(Value),
  Deferred(Deferred),
}

impl Provided {
  pub fn lazy<F>(provider: F) -> Self
  where
    F: Fn() -> Value + Send + Sync + 'static,
  {
    Provided::Deferred(Arc::new(provider))
  }

  pub fn evaluate(&self) -> Value {
    match self {
      Provided::Literal(value) => value.clone(),
      Provided::Deferred(provider) => provider(),
    }
  }
}

impl fmt::Debug for Provided {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Provided::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
      Provided::Deferred(_) => f.write_str("Deferred(..)"),
    }
  }
}

impl<V: Into<Value>> From<V> for Provided {
  fn from(value: V) -> Self {
    Provided::Literal(value.into())
  }
}
