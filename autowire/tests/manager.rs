use fibre_autowire::{
  options, Container, Error, InstanceOf, ManagerConfig, Options, PluginManager, PluginSpec,
  ServiceContainer, Value,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

// --- Test Fixtures ---

/// What every fixture factory builds: which service, with which options.
#[derive(Debug, Clone, PartialEq)]
struct Built {
  service: String,
  options: Option<Options>,
}

type Calls = Arc<Mutex<Vec<Built>>>;

fn recording_container(services: &[&str]) -> (Arc<Container>, Calls) {
  let container = Arc::new(Container::new());
  let calls: Calls = Arc::default();
  for service in services {
    let calls = calls.clone();
    container.add_factory(*service, move |_, identifier, options| {
      let built = Built {
        service: identifier.to_owned(),
        options: options.cloned(),
      };
      calls.lock().push(built.clone());
      Ok(Value::new(built))
    });
  }
  (container, calls)
}

fn manager_config() -> ManagerConfig {
  ManagerConfig::from_json_str(
    &json!({
      "default": "adapter_2",
      "default_options": {
        "default_option": "test_default",
        "option_1": "option 1 default"
      },
      "plugins": {
        "adapter_1": {"service": "service_via_factory_a", "options": {"option_1": "Option 1"}},
        "adapter_2": {"service": "service_via_factory_b", "options": {"option_1": "Option 2"}},
        "short_notation": {"option_1": "Option 3"},
        "short_notation_no_options": {},
        "auto": {"service": "test", "options": {"option_1": "Option 4"}}
      }
    })
    .to_string(),
  )
  .unwrap()
}

fn setup() -> (PluginManager, Calls) {
  let (container, calls) = recording_container(&[
    "service_via_factory_a",
    "service_via_factory_b",
    "short_notation",
    "short_notation_no_options",
    "factory_service_not_used_by_plugins",
  ]);
  let manager = PluginManager::with_config(container, manager_config()).unwrap();
  (manager, calls)
}

fn built(value: &Value) -> Built {
  value.downcast_ref::<Built>().cloned().unwrap()
}

fn expected(service: &str, options: Option<Options>) -> Built {
  Built {
    service: service.to_owned(),
    options,
  }
}

// --- Tests ---

#[test]
fn test_plugins_are_built_with_merged_options() {
  // Arrange
  let (manager, calls) = setup();

  // Act
  let a = manager.get("adapter_1", None).unwrap();
  let b = manager.get("adapter_2", None).unwrap();
  let c = manager.get("short_notation", None).unwrap();
  let d = manager.get("short_notation_no_options", None).unwrap();
  let e = manager.get("factory_service_not_used_by_plugins", None).unwrap();
  let f = manager
    .get(
      "factory_service_not_used_by_plugins",
      Some(&options! { "with" => "options" }),
    )
    .unwrap();

  // Assert
  let merged = |option_1: &str| {
    Some(options! { "default_option" => "test_default", "option_1" => option_1 })
  };
  assert_eq!(built(&a), expected("service_via_factory_a", merged("Option 1")));
  assert_eq!(built(&b), expected("service_via_factory_b", merged("Option 2")));
  assert_eq!(built(&c), expected("short_notation", merged("Option 3")));
  assert_eq!(
    built(&d),
    expected("short_notation_no_options", merged("option 1 default"))
  );
  assert_eq!(built(&e), expected("factory_service_not_used_by_plugins", None));
  assert_eq!(
    built(&f),
    expected(
      "factory_service_not_used_by_plugins",
      Some(options! { "with" => "options" })
    )
  );
  assert_eq!(calls.lock().len(), 6);

  // Shared by default: nothing new is built.
  assert!(manager.get("adapter_2", None).unwrap().ptr_eq(&b));
  assert!(manager
    .get("factory_service_not_used_by_plugins", None)
    .unwrap()
    .ptr_eq(&e));
  assert_eq!(calls.lock().len(), 6);
}

#[test]
fn test_get_plugin_builds_once() {
  let (manager, calls) = setup();

  let first = manager.get_plugin("adapter_1").unwrap();
  let second = manager.get_plugin("adapter_1").unwrap();

  assert!(first.ptr_eq(&second));
  assert_eq!(calls.lock().len(), 1);
}

#[test]
fn test_options_bypass_plugin_configuration() {
  let (manager, calls) = setup();

  let err = manager
    .get("adapter_1", Some(&options! { "option_1" => "ad hoc" }))
    .unwrap_err();

  // "adapter_1" is only a plugin name; the container itself has no such service.
  assert!(matches!(err, Error::ServiceNotFound { identifier } if identifier == "adapter_1"));
  assert!(calls.lock().is_empty());
}

#[test]
fn test_empty_options_count_as_none() {
  let (manager, _calls) = setup();

  let plugin = manager.get("adapter_1", Some(&Options::new())).unwrap();

  assert_eq!(built(&plugin).service, "service_via_factory_a");
}

#[test]
fn test_default_plugin() {
  let (manager, calls) = setup();

  let default = manager.get_default().unwrap();
  assert_eq!(built(&default).service, "service_via_factory_b");

  manager.set_default("adapter_1").unwrap();
  let default = manager.get_default().unwrap();
  assert_eq!(built(&default).service, "service_via_factory_a");
  assert_eq!(calls.lock().len(), 2);

  let err = manager.set_default("unknown").unwrap_err();
  assert!(matches!(err, Error::UnknownPlugin { name } if name == "unknown"));
  assert_eq!(manager.default_name().as_deref(), Some("adapter_1"));
}

#[test]
fn test_unknown_plugin() {
  let (manager, _calls) = setup();

  let err = manager.get_plugin("unknown").unwrap_err();

  assert!(matches!(err, Error::UnknownPlugin { name } if name == "unknown"));
}

#[test]
fn test_no_default_configured() {
  let manager = PluginManager::new(Arc::new(Container::new())).named("cache manager");

  let err = manager.get_default().unwrap_err();

  assert!(matches!(err, Error::InvalidDefault { manager } if manager == "cache manager"));
}

#[test]
fn test_has_with_plugins() {
  let (manager, _calls) = setup();

  assert!(manager.has("adapter_1"));
  assert!(manager.has("factory_service_not_used_by_plugins"));
  assert!(!manager.has("adapter_unknown"));
  assert!(manager.has_plugin("auto"));
  assert!(!manager.has_plugin("factory_service_not_used_by_plugins"));
}

#[test]
fn test_configure_is_additive() {
  let (manager, _calls) = setup();

  manager
    .configure(
      ManagerConfig::from_yaml_str(
        r#"
plugins:
  extra:
    service: service_via_factory_a
default_options:
  option_1: replaced default
"#,
      )
      .unwrap(),
    )
    .unwrap();

  assert!(manager.has_plugin("adapter_1"));
  assert!(manager.has_plugin("extra"));
  assert_eq!(manager.default_name().as_deref(), Some("adapter_2"));

  let extra = manager.get_plugin("extra").unwrap();
  assert_eq!(
    built(&extra).options,
    Some(options! { "default_option" => "test_default", "option_1" => "replaced default" })
  );
}

#[test]
fn test_default_must_exist_at_configure_time() {
  let (container, _calls) = recording_container(&[]);
  let config = ManagerConfig::from_yaml_str("default: missing\n").unwrap();

  let err = PluginManager::with_config(container, config).err().unwrap();

  assert!(matches!(err, Error::UnknownPlugin { name } if name == "missing"));
}

#[test]
fn test_round_trip_default() {
  // Arrange
  let (container, calls) = recording_container(&["svcA"]);
  let config = ManagerConfig::from_yaml_str(
    r#"
default: adapter_1
default_options:
  opt1: default
  opt2: D2
plugins:
  adapter_1:
    service: svcA
    options:
      opt1: V1
"#,
  )
  .unwrap();
  let manager = PluginManager::with_config(container, config).unwrap();

  // Act
  let first = manager.get_default().unwrap();
  let second = manager.get_default().unwrap();

  // Assert
  assert!(first.ptr_eq(&second));
  assert_eq!(
    *calls.lock(),
    vec![expected("svcA", Some(options! { "opt1" => "V1", "opt2" => "D2" }))]
  );
}

#[test]
fn test_validation_hook_rejects_wrong_shape() {
  let container = Arc::new(Container::new());
  container.add_factory("text", |_, _, _| Ok(Value::from("not a Built")));
  let manager = PluginManager::new(container).with_validator(InstanceOf::<Built>::new());
  manager.add_plugin("bad", PluginSpec::new("text", Options::new()));

  let err = manager.get_plugin("bad").unwrap_err();

  assert!(matches!(err, Error::ValidationRejected { name, .. } if name == "bad"));
  // A rejected plugin is not cached.
  assert!(manager.get_plugin("bad").is_err());
}

#[test]
fn test_closure_validator() {
  let (container, _calls) = recording_container(&["svc"]);
  let manager = PluginManager::new(container).with_validator(|plugin: &Value| {
    match plugin.downcast_ref::<Built>() {
      Some(built) if built.options.as_ref().is_some_and(|o| o.contains_key("dsn")) => Ok(()),
      _ => Err("a dsn option is required".to_owned()),
    }
  });
  manager.add_plugin("without", PluginSpec::new("svc", Options::new()));
  manager.add_plugin("with", PluginSpec::new("svc", options! { "dsn" => "mem://" }));

  assert!(manager.get_plugin("with").is_ok());
  let err = manager.get_plugin("without").unwrap_err();
  assert!(matches!(err, Error::ValidationRejected { reason, .. } if reason == "a dsn option is required"));
}

#[test]
fn test_manager_is_a_service_container() {
  let (manager, _calls) = setup();
  let container: &dyn ServiceContainer = &manager;

  assert!(container.has("short_notation"));
  let plugin = container.get("short_notation", None).unwrap();
  assert!(plugin.ptr_eq(&manager.get_plugin("short_notation").unwrap()));

  let fresh = container.build("short_notation", &Options::new()).unwrap();
  assert!(!fresh.ptr_eq(&plugin));
}
