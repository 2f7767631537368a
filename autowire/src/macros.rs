//! Public macros for building overrides and option maps.

/// Builds an [`Overrides`](crate::Overrides) set.
///
/// Plain entries are literal values; `lazy` entries are providers evaluated
/// each time a resolution needs them.
///
/// # Examples
///
/// ```
/// use fibre_autowire::{overrides, Value};
///
/// let overrides = overrides! {
///   "host" => "localhost",
///   "port" => 2525,
///   lazy "token" => || Value::from("generated"),
/// };
/// assert!(overrides.get("token").is_some());
/// ```
#[macro_export]
macro_rules! overrides {
    // Internal rules: one entry at a time.
    (@acc $acc:ident; ) => {};
    (@acc $acc:ident; lazy $name:expr => $provider:expr $(, $($rest:tt)*)?) => {
        $acc.insert($name, $crate::Provided::lazy($provider));
        $crate::overrides!(@acc $acc; $($($rest)*)?);
    };
    (@acc $acc:ident; $name:expr => $value:expr $(, $($rest:tt)*)?) => {
        $acc.insert($name, $value);
        $crate::overrides!(@acc $acc; $($($rest)*)?);
    };

    () => {
        $crate::Overrides::new()
    };
    ($($body:tt)+) => {{
        let mut overrides = $crate::Overrides::new();
        $crate::overrides!(@acc overrides; $($body)+);
        overrides
    }};
}

/// Builds an [`Options`](crate::Options) map from JSON-like literals.
///
/// # Examples
///
/// ```
/// use fibre_autowire::options;
///
/// let options = options! { "ttl" => 60, "tags" => ["a", "b"] };
/// assert_eq!(options["ttl"], 60);
/// ```
#[macro_export]
macro_rules! options {
    () => {
        $crate::Options::new()
    };
    ($($key:expr => $value:tt),+ $(,)?) => {{
        let mut options = $crate::Options::new();
        $(
            options.insert(::std::string::String::from($key), $crate::serde_json::json!($value));
        )+
        options
    }};
}
