use fibre_autowire::{Container, ManagerConfig, Options, PluginManager, Value};
use std::sync::Arc;

// A connection pool that remembers the options it was built with.
struct Pool {
  dsn: String,
  size: i64,
}

fn main() {
  let container = Arc::new(Container::new());

  // --- Factory Registration ---
  // The plugin manager calls `build`, so this runs once per configured plugin.
  container.add_factory("postgres", |_, _, options| {
    let options = options.cloned().unwrap_or_default();
    println!("Building postgres pool with {:?}", options);
    Ok(Value::new(pool_from(&options)))
  });

  // --- Configuration ---
  let config = ManagerConfig::from_yaml_str(
    r#"
default: primary
default_options:
  size: 4
plugins:
  primary:
    service: postgres
    options:
      dsn: postgres://primary/app
  replica:
    service: postgres
    options:
      dsn: postgres://replica/app
      size: 16
"#,
  )
  .expect("valid configuration");

  let manager = PluginManager::with_config(container, config)
    .expect("default names a configured plugin")
    .named("database manager");

  println!("--- Resolving Plugins ---");
  let primary = manager.get_default().expect("primary pool");
  let replica = manager.get("replica", None).expect("replica pool");

  let p = primary.downcast_ref::<Pool>().expect("a Pool");
  let r = replica.downcast_ref::<Pool>().expect("a Pool");
  println!("primary: {} (size {})", p.dsn, p.size);
  println!("replica: {} (size {})", r.dsn, r.size);
  assert_eq!(p.size, 4);
  assert_eq!(r.size, 16);

  // Plugins are cached for the manager's lifetime.
  let again = manager.get("primary", None).expect("primary pool");
  assert!(again.ptr_eq(&primary), "plugins should be shared");
  println!("Second lookup returned the cached primary pool.");
}

fn pool_from(options: &Options) -> Pool {
  Pool {
    dsn: options
      .get("dsn")
      .and_then(|v| v.as_str())
      .unwrap_or("postgres://localhost")
      .to_owned(),
    size: options.get("size").and_then(|v| v.as_i64()).unwrap_or(1),
  }
}
