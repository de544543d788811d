use crate::error::{Result, WeaveError};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// One captured argument
#[derive(Clone)]
pub struct Argument {
    name: &'static str,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    /// `Some(false)` when an optional argument was passed as `None`
    presence: Option<bool>,
}

impl Argument {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is_optional(&self) -> bool {
        self.presence.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.presence == Some(false)
    }

    /// `Debug` text of the value for common primitive types, else `None`
    pub fn debug_value(&self) -> Option<String> {
        macro_rules! try_debug {
            ($($ty:ty),* $(,)?) => {
                $(
                    if let Some(value) = self.value.downcast_ref::<$ty>() {
                        return Some(format!("{value:?}"));
                    }
                    if let Some(value) = self.value.downcast_ref::<Option<$ty>>() {
                        return Some(format!("{value:?}"));
                    }
                )*
            };
        }
        try_debug!(
            String, &'static str, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64,
            u128, usize, f32, f64,
        );
        None
    }

    /// Debug text when available, otherwise the type name in angle brackets
    pub fn describe(&self) -> String {
        self.debug_value()
            .unwrap_or_else(|| format!("<{}>", self.type_name))
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}

/// Snapshot of the call arguments, taken once before the chain runs
#[derive(Clone, Default)]
pub struct Arguments {
    entries: Arc<[Argument]>,
}

impl Arguments {
    pub fn builder() -> ArgumentsBuilder {
        ArgumentsBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(Argument::name).collect()
    }

    /// `name=value` pairs for logging
    pub fn describe(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|arg| format!("{}={}", arg.name, arg.describe()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.entries.iter().find(|arg| arg.name == name)
    }

    /// Typed access to a captured value
    pub fn value<T: 'static>(&self, name: &str) -> Result<&T> {
        let argument = self.get(name).ok_or_else(|| WeaveError::ArgumentMissing {
            name: name.to_string(),
        })?;
        argument.value::<T>().ok_or_else(|| WeaveError::ArgumentType {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

#[derive(Default)]
pub struct ArgumentsBuilder {
    entries: Vec<Argument>,
}

impl ArgumentsBuilder {
    pub fn value<T: Any + Send + Sync>(mut self, name: &'static str, value: T) -> Self {
        self.entries.push(Argument {
            name,
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
            presence: None,
        });
        self
    }

    /// Capture an `Option` argument, remembering whether it was `None`
    pub fn optional<T: Any + Send + Sync>(mut self, name: &'static str, value: Option<T>) -> Self {
        self.entries.push(Argument {
            name,
            type_name: std::any::type_name::<Option<T>>(),
            presence: Some(value.is_some()),
            value: Arc::new(value),
        });
        self
    }

    pub fn build(self) -> Arguments {
        Arguments {
            entries: self.entries.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup() {
        let args = Arguments::builder()
            .value("id", 42_u64)
            .value("note", String::from("gift"))
            .build();

        assert_eq!(args.len(), 2);
        assert_eq!(*args.value::<u64>("id").unwrap(), 42);
        assert_eq!(args.value::<String>("note").unwrap(), "gift");
        assert_eq!(args.names(), vec!["id", "note"]);
    }

    #[test]
    fn test_lookup_failures() {
        let args = Arguments::builder().value("id", 42_u64).build();

        assert!(matches!(
            args.value::<u64>("missing"),
            Err(WeaveError::ArgumentMissing { .. })
        ));
        assert!(matches!(
            args.value::<String>("id"),
            Err(WeaveError::ArgumentType { .. })
        ));
    }

    #[test]
    fn test_optional_records_presence() {
        let args = Arguments::builder()
            .optional::<String>("coupon", None)
            .optional("email", Some(String::from("a@b.c")))
            .value("count", 1_u32)
            .build();

        assert!(args.get("coupon").unwrap().is_none());
        assert!(!args.get("email").unwrap().is_none());
        assert!(!args.get("count").unwrap().is_optional());
    }

    #[test]
    fn test_describe_renders_primitives_and_names_the_rest() {
        struct Opaque;
        let args = Arguments::builder()
            .value("id", 7_u64)
            .optional("coupon", Some(String::from("SPRING")))
            .value("blob", Opaque)
            .build();

        assert_eq!(args.get("id").unwrap().debug_value().as_deref(), Some("7"));
        let described = args.describe();
        assert_eq!(described[0], "id=7");
        assert_eq!(described[1], "coupon=Some(\"SPRING\")");
        assert!(described[2].starts_with("blob=<") && described[2].ends_with("Opaque>"));
    }
}
