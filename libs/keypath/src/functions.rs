//! Path functions
//!
//! A function segment (`name.#upper`) invokes a named, pluggable operation
//! instead of plain property or index access. Functions declare their input
//! and value types and whether they are deterministic; a non-deterministic
//! function makes memoization unsound, so the engine stops caching for the
//! rest of that root's session.
//!
//! Built-in functions live in a compile-time `phf` table; caller
//! registrations are layered above it and shadow builtins by name.

use crate::context::NavigationContext;
use crate::error::{Error, Result};
use callis_model::{TypeDescriptor, Value};
use phf::phf_map;
use std::collections::HashMap;
use std::sync::Arc;

/// A named extension invoked as a path segment.
///
/// `get` must always be supported; `create` and `set` default to an
/// unsupported-operation error.
pub trait PathFunction: Send + Sync {
    /// Declared input type. The engine converts the parent value to this
    /// type before invoking; `Any` skips conversion.
    fn input_type(&self) -> TypeDescriptor {
        TypeDescriptor::Any
    }

    /// Declared result type, used by type-only resolution.
    fn value_type(&self) -> TypeDescriptor {
        TypeDescriptor::Any
    }

    fn get(&self, input: &Value, name: &str, ctx: &NavigationContext) -> Result<Option<Value>>;

    fn create(&self, input: &Value, name: &str, ctx: &NavigationContext) -> Result<Option<Value>> {
        let _ = (input, ctx);
        Err(Error::UnsupportedFunction {
            name: name.to_string(),
            operation: "create".to_string(),
        })
    }

    fn set(
        &self,
        input: &mut Value,
        name: &str,
        value: Value,
        ctx: &NavigationContext,
    ) -> Result<Option<Value>> {
        let _ = (input, value, ctx);
        Err(Error::UnsupportedFunction {
            name: name.to_string(),
            operation: "set".to_string(),
        })
    }

    /// Whether repeated invocations with the same input yield the same
    /// result. `false` disables caching for the remainder of the root's
    /// session.
    fn is_deterministic(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Upper,
    Lower,
    Trim,
    Size,
    Keys,
    First,
    Last,
}

/// Static builtin table: O(1) name lookup with zero runtime allocation.
static BUILTINS: phf::Map<&'static str, Builtin> = phf_map! {
    "upper" => Builtin::Upper,
    "lower" => Builtin::Lower,
    "trim" => Builtin::Trim,
    "size" => Builtin::Size,
    "keys" => Builtin::Keys,
    "first" => Builtin::First,
    "last" => Builtin::Last,
};

struct BuiltinFunction(Builtin);

impl PathFunction for BuiltinFunction {
    fn input_type(&self) -> TypeDescriptor {
        match self.0 {
            Builtin::Upper | Builtin::Lower | Builtin::Trim => TypeDescriptor::Str,
            _ => TypeDescriptor::Any,
        }
    }

    fn value_type(&self) -> TypeDescriptor {
        match self.0 {
            Builtin::Upper | Builtin::Lower | Builtin::Trim => TypeDescriptor::Str,
            Builtin::Size => TypeDescriptor::Int,
            Builtin::Keys => TypeDescriptor::list(TypeDescriptor::Str),
            Builtin::First | Builtin::Last => TypeDescriptor::Any,
        }
    }

    fn get(&self, input: &Value, _name: &str, _ctx: &NavigationContext) -> Result<Option<Value>> {
        let result = match self.0 {
            Builtin::Upper => input.as_str().map(|s| Value::string(s.to_uppercase())),
            Builtin::Lower => input.as_str().map(|s| Value::string(s.to_lowercase())),
            Builtin::Trim => input.as_str().map(|s| Value::string(s.trim())),
            Builtin::Size => match input {
                Value::Str(s) => Some(Value::int(s.chars().count() as i64)),
                Value::List(items) | Value::Bag(items) => Some(Value::int(items.len() as i64)),
                Value::Tuple(items) => Some(Value::int(items.len() as i64)),
                Value::Map(entries) => Some(Value::int(entries.len() as i64)),
                Value::Record(r) => Some(Value::int(r.len() as i64)),
                _ => None,
            },
            Builtin::Keys => match input {
                Value::Map(entries) => Some(Value::List(
                    entries.keys().map(|k| Value::Str(k.clone())).collect(),
                )),
                Value::Record(r) => Some(Value::List(
                    r.field_names().map(|n| Value::Str(n.clone())).collect(),
                )),
                _ => None,
            },
            Builtin::First => sequence_items(input).and_then(|items| items.first().cloned()),
            Builtin::Last => sequence_items(input).and_then(|items| items.last().cloned()),
        };
        Ok(result)
    }
}

fn sequence_items(value: &Value) -> Option<&[Value]> {
    match value {
        Value::List(items) | Value::Bag(items) => Some(items),
        Value::Tuple(items) => Some(items),
        _ => None,
    }
}

/// Function registry: caller registrations over the builtin table.
#[derive(Default)]
pub struct FunctionRegistry {
    custom: HashMap<Arc<str>, Arc<dyn PathFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `name`, shadowing a builtin of the same name.
    pub fn register(&mut self, name: impl Into<Arc<str>>, function: Arc<dyn PathFunction>) {
        self.custom.insert(name.into(), function);
    }

    /// Resolve a function by name: registrations first, then builtins.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn PathFunction>> {
        if let Some(function) = self.custom.get(name) {
            return Some(function.clone());
        }
        BUILTINS
            .get(name)
            .map(|b| Arc::new(BuiltinFunction(*b)) as Arc<dyn PathFunction>)
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTINS.keys().copied()
    }
}
