//! Option maps handed to service factories, and how two of them merge.

use crate::value::Value;
use serde_json::Value as Json;

/// String-keyed option map passed to factories when a service is built.
pub type Options = serde_json::Map<String, Json>;

/// Overlays `overlay` onto `base` and returns the result.
///
/// Overlay keys win. When both sides hold a map under the same key the two
/// maps are merged recursively; when both hold an array, the overlay items
/// are appended to the base array.
pub fn merge(base: &Options, overlay: &Options) -> Options {
  let mut merged = base.clone();
  merge_into(&mut merged, overlay);
  merged
}

fn merge_into(target: &mut Options, overlay: &Options) {
  for (key, incoming) in overlay {
    match (target.get_mut(key), incoming) {
      (Some(Json::Object(existing)), Json::Object(incoming)) => merge_into(existing, incoming),
      (Some(Json::Array(existing)), Json::Array(incoming)) => {
        existing.extend(incoming.iter().cloned())
      }
      _ => {
        target.insert(key.clone(), incoming.clone());
      }
    }
  }
}

/// Converts a JSON option into the resolver's value representation.
///
/// Strings, integers, floats and booleans become `String`, `i64`, `f64` and
/// `bool`; arrays become `Vec<Value>`; objects stay as `serde_json::Map` and
/// `null` becomes `()`.
pub fn json_to_value(json: &Json) -> Value {
  match json {
    Json::Null => Value::new(()),
    Json::Bool(b) => Value::new(*b),
    Json::Number(n) => match n.as_i64() {
      Some(i) => Value::new(i),
      None => Value::new(n.as_f64().unwrap_or(f64::NAN)),
    },
    Json::String(s) => Value::new(s.clone()),
    Json::Array(items) => Value::new(items.iter().map(json_to_value).collect::<Vec<_>>()),
    Json::Object(map) => Value::new(map.clone()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn opts(value: Json) -> Options {
    match value {
      Json::Object(map) => map,
      other => panic!("not an object: {other}"),
    }
  }

  #[test]
  fn specific_keys_override_defaults() {
    let defaults = opts(json!({"a": 1, "b": 2}));
    let specific = opts(json!({"b": 3}));

    assert_eq!(merge(&defaults, &specific), opts(json!({"a": 1, "b": 3})));
  }

  #[test]
  fn nested_maps_merge_recursively() {
    let defaults = opts(json!({"db": {"host": "localhost", "port": 5432}, "debug": false}));
    let specific = opts(json!({"db": {"port": 6432}}));

    assert_eq!(
      merge(&defaults, &specific),
      opts(json!({"db": {"host": "localhost", "port": 6432}, "debug": false}))
    );
  }

  #[test]
  fn arrays_are_appended() {
    let defaults = opts(json!({"tags": ["a", "b"]}));
    let specific = opts(json!({"tags": ["c"]}));

    assert_eq!(merge(&defaults, &specific), opts(json!({"tags": ["a", "b", "c"]})));
  }

  #[test]
  fn scalar_replaces_map() {
    let defaults = opts(json!({"db": {"host": "localhost"}}));
    let specific = opts(json!({"db": "sqlite://memory"}));

    assert_eq!(merge(&defaults, &specific), opts(json!({"db": "sqlite://memory"})));
  }

  #[test]
  fn json_numbers_keep_their_kind() {
    assert_eq!(json_to_value(&json!(7)).downcast_ref::<i64>(), Some(&7));
    assert_eq!(json_to_value(&json!(1.5)).downcast_ref::<f64>(), Some(&1.5));
    let list = json_to_value(&json!(["x", true]));
    let items = list.downcast_ref::<Vec<Value>>().unwrap();
    assert_eq!(items[0].downcast_ref::<String>().map(String::as_str), Some("x"));
    assert_eq!(items[1].downcast_ref::<bool>(), Some(&true));
  }
}
