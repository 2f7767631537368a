use fibre_autowire::{
  overrides, Arguments, Autowire, AutowireFactory, Container, Method, Parameter, Resolver,
  Result, ServiceContainer, Value,
};
use std::sync::Arc;

struct Clock;

impl Clock {
  fn now(&self) -> &'static str {
    "09:00"
  }
}

impl Autowire for Clock {
  fn identifier() -> &'static str {
    "Clock"
  }

  fn construct(_args: Arguments) -> Result<Self> {
    Ok(Clock)
  }
}

struct Greeter {
  clock: Arc<Clock>,
  greeting: String,
}

impl Autowire for Greeter {
  fn identifier() -> &'static str {
    "Greeter"
  }

  fn parameters() -> Vec<Parameter> {
    vec![
      Parameter::service::<Clock>("clock"),
      Parameter::string("greeting").with_default("Hello"),
    ]
  }

  fn construct(args: Arguments) -> Result<Self> {
    Ok(Greeter {
      clock: args.get("clock")?,
      greeting: args.cloned("greeting")?,
    })
  }

  fn methods() -> Vec<Method<Self>> {
    vec![Method::new(
      "greet",
      vec![Parameter::string("name")],
      |this: &Self, args| {
        let name: String = args.cloned("name")?;
        Ok(Value::new(format!("[{}] {}, {}!", this.clock.now(), this.greeting, name)))
      },
    )]
  }
}

fn main() {
  let container = Arc::new(Container::new());
  let resolver = Arc::new(Resolver::new(container.clone()));
  resolver.register::<Clock>().register::<Greeter>();

  // Anything the resolver knows can now be pulled straight from the container.
  container.add_fallback(AutowireFactory::new(&resolver));

  // --- Rules ---
  resolver.when("Greeter").needs("greeting").give("Good morning");

  // --- Calls ---
  let greeting = resolver
    .call("Greeter@greet", &overrides! { "name" => "Ada" })
    .expect("Greeter@greet resolves");
  println!("{}", greeting.downcast_ref::<String>().expect("a String"));

  // Overrides beat rules.
  let greeting = resolver
    .call(
      "Greeter@greet",
      &overrides! { "name" => "Grace", "greeting" => "Hi" },
    )
    .expect("Greeter@greet resolves");
  println!("{}", greeting.downcast_ref::<String>().expect("a String"));

  let clock = container.get("Clock", None).expect("autowired clock");
  println!("Clock resolved through the container: {}", clock.is::<Clock>());
}
