//! Static type descriptors
//!
//! `TypeDescriptor` is the closed vocabulary of static types the engine
//! reasons about: the scalar kinds, the container shapes with their component
//! types, named record types, and `Any` for "not statically known".
//! `Any` is knowledge absence, not an empty value.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Runtime shape of a value, driving segment dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Sequence,
    FixedSequence,
    Bag,
    Mapping,
    Record,
}

/// Static type of a path location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Not statically known. Unsafe for type-only queries and
    /// unconstructible by the default factory.
    Any,
    Bool,
    Int,
    Decimal,
    Str,
    /// Growable ordered sequence with the given element type.
    List(Box<TypeDescriptor>),
    /// Fixed-size ordered sequence; the length is part of the type when known.
    Tuple(Box<TypeDescriptor>, Option<usize>),
    /// Unordered collection with the given element type.
    Bag(Box<TypeDescriptor>),
    /// String-keyed mapping with the given value type.
    Map(Box<TypeDescriptor>),
    /// Named record type; field types come from the schema provider.
    Record(Arc<str>),
}

impl TypeDescriptor {
    pub fn list(elem: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(elem))
    }

    pub fn tuple(elem: TypeDescriptor, len: Option<usize>) -> Self {
        TypeDescriptor::Tuple(Box::new(elem), len)
    }

    pub fn bag(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Bag(Box::new(elem))
    }

    pub fn map(value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(value))
    }

    pub fn record(name: impl Into<Arc<str>>) -> Self {
        TypeDescriptor::Record(name.into())
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeDescriptor::Any)
    }

    /// Component type for indexed access, when this descriptor has one.
    /// `Any` components come back as `Any`; non-sequence types yield `None`.
    pub fn element_type(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::List(elem)
            | TypeDescriptor::Tuple(elem, _)
            | TypeDescriptor::Bag(elem) => Some(elem),
            _ => None,
        }
    }

    /// Value type for keyed access, when this descriptor is a mapping.
    pub fn value_type(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a runtime value already satisfies this descriptor, without
    /// conversion. `Any` accepts everything. An integer satisfies a decimal
    /// slot directly (numeric equivalence); no other cross-kind match exists.
    pub fn is_satisfied_by(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDescriptor::Any, _) => true,
            (TypeDescriptor::Bool, Value::Bool(_)) => true,
            (TypeDescriptor::Int, Value::Int(_)) => true,
            (TypeDescriptor::Decimal, Value::Decimal(_) | Value::Int(_)) => true,
            (TypeDescriptor::Str, Value::Str(_)) => true,
            (TypeDescriptor::List(elem), Value::List(items)) => {
                elem.is_any() || items.iter().all(|item| elem.is_satisfied_by(item))
            }
            (TypeDescriptor::Tuple(elem, len), Value::Tuple(items)) => {
                len.map_or(true, |n| n == items.len())
                    && (elem.is_any() || items.iter().all(|item| elem.is_satisfied_by(item)))
            }
            (TypeDescriptor::Bag(elem), Value::Bag(items)) => {
                elem.is_any() || items.iter().all(|item| elem.is_satisfied_by(item))
            }
            (TypeDescriptor::Map(value_ty), Value::Map(entries)) => {
                value_ty.is_any() || entries.values().all(|v| value_ty.is_satisfied_by(v))
            }
            (TypeDescriptor::Record(name), Value::Record(r)) => name.as_ref() == r.type_name(),
            _ => false,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Any => write!(f, "Any"),
            TypeDescriptor::Bool => write!(f, "Bool"),
            TypeDescriptor::Int => write!(f, "Int"),
            TypeDescriptor::Decimal => write!(f, "Decimal"),
            TypeDescriptor::Str => write!(f, "Str"),
            TypeDescriptor::List(elem) => write!(f, "List<{}>", elem),
            TypeDescriptor::Tuple(elem, Some(len)) => write!(f, "Tuple<{}; {}>", elem, len),
            TypeDescriptor::Tuple(elem, None) => write!(f, "Tuple<{}>", elem),
            TypeDescriptor::Bag(elem) => write!(f, "Bag<{}>", elem),
            TypeDescriptor::Map(value) => write!(f, "Map<{}>", value),
            TypeDescriptor::Record(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    #[test]
    fn test_satisfaction_scalars() {
        assert!(TypeDescriptor::Int.is_satisfied_by(&Value::int(1)));
        assert!(TypeDescriptor::Str.is_satisfied_by(&Value::string("x")));
        assert!(!TypeDescriptor::Int.is_satisfied_by(&Value::string("1")));
        assert!(TypeDescriptor::Any.is_satisfied_by(&Value::bool(true)));
    }

    #[test]
    fn test_numeric_equivalence() {
        // An integer fills a decimal slot without conversion.
        assert!(TypeDescriptor::Decimal.is_satisfied_by(&Value::int(42)));
        assert!(!TypeDescriptor::Int.is_satisfied_by(&Value::decimal(1.into())));
    }

    #[test]
    fn test_satisfaction_containers() {
        let ints = TypeDescriptor::list(TypeDescriptor::Int);
        assert!(ints.is_satisfied_by(&Value::List(vec![Value::int(1), Value::int(2)])));
        assert!(!ints.is_satisfied_by(&Value::List(vec![Value::string("a")])));

        let pair = TypeDescriptor::tuple(TypeDescriptor::Int, Some(2));
        assert!(pair.is_satisfied_by(&Value::Tuple(Box::from([Value::int(1), Value::int(2)]))));
        assert!(!pair.is_satisfied_by(&Value::Tuple(Box::from([Value::int(1)]))));
    }

    #[test]
    fn test_satisfaction_records() {
        let ty = TypeDescriptor::record("Customer");
        assert!(ty.is_satisfied_by(&Value::Record(Record::new("Customer"))));
        assert!(!ty.is_satisfied_by(&Value::Record(Record::new("Order"))));
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeDescriptor::list(TypeDescriptor::Int).to_string(), "List<Int>");
        assert_eq!(
            TypeDescriptor::tuple(TypeDescriptor::Str, Some(3)).to_string(),
            "Tuple<Str; 3>"
        );
        assert_eq!(TypeDescriptor::record("Order").to_string(), "Order");
    }
}
