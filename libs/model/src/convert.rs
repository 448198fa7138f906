//! Value conversion
//!
//! `Converter` coerces a value toward a target descriptor. `Ok(None)` means
//! "not my conversion" so a caller can fall through to the next converter in
//! its chain; `Err` means the conversion was attempted and is impossible.

use crate::error::{Error, Result};
use crate::types::TypeDescriptor;
use crate::value::Value;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converts a value to a requested target type.
pub trait Converter: Send + Sync {
    /// Attempt the conversion. `Ok(None)` declines, leaving the decision to
    /// the next converter in the caller's chain.
    fn convert(&self, value: &Value, target: &TypeDescriptor) -> Result<Option<Value>>;
}

/// Scalar coercions: int↔decimal, string↔number, string↔bool, and scalar
/// rendering to string. Container shapes are never converted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl DefaultConverter {
    fn fail(value: &Value, target: &TypeDescriptor) -> Error {
        Error::Unconvertible {
            from: value.type_descriptor().to_string(),
            to: target.to_string(),
        }
    }
}

impl Converter for DefaultConverter {
    fn convert(&self, value: &Value, target: &TypeDescriptor) -> Result<Option<Value>> {
        let converted = match (value, target) {
            (Value::Int(n), TypeDescriptor::Decimal) => Value::Decimal(Decimal::from(*n)),
            (Value::Decimal(d), TypeDescriptor::Int) => {
                let truncated = d.trunc();
                if truncated != *d {
                    return Err(Self::fail(value, target));
                }
                Value::Int(truncated.to_i64().ok_or_else(|| Self::fail(value, target))?)
            }
            (Value::Str(s), TypeDescriptor::Int) => Value::Int(
                s.trim()
                    .parse::<i64>()
                    .map_err(|_| Self::fail(value, target))?,
            ),
            (Value::Str(s), TypeDescriptor::Decimal) => Value::Decimal(
                Decimal::from_str(s.trim()).map_err(|_| Self::fail(value, target))?,
            ),
            (Value::Str(s), TypeDescriptor::Bool) => match s.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(Self::fail(value, target)),
            },
            (Value::Int(n), TypeDescriptor::Str) => Value::string(n.to_string()),
            (Value::Decimal(d), TypeDescriptor::Str) => Value::string(d.to_string()),
            (Value::Bool(b), TypeDescriptor::Str) => Value::string(b.to_string()),
            _ => return Ok(None),
        };
        Ok(Some(converted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(value: Value, target: TypeDescriptor) -> Result<Option<Value>> {
        DefaultConverter.convert(&value, &target)
    }

    #[test]
    fn test_numeric_coercions() {
        assert_eq!(
            convert(Value::int(3), TypeDescriptor::Decimal).unwrap(),
            Some(Value::Decimal(3.into()))
        );
        assert_eq!(
            convert(Value::Decimal(7.into()), TypeDescriptor::Int).unwrap(),
            Some(Value::Int(7))
        );
        // Fractional decimals do not silently truncate.
        assert!(convert(
            Value::Decimal(Decimal::from_str("1.5").unwrap()),
            TypeDescriptor::Int
        )
        .is_err());
    }

    #[test]
    fn test_string_parses() {
        assert_eq!(
            convert(Value::string("42"), TypeDescriptor::Int).unwrap(),
            Some(Value::Int(42))
        );
        assert_eq!(
            convert(Value::string("true"), TypeDescriptor::Bool).unwrap(),
            Some(Value::Bool(true))
        );
        assert!(convert(Value::string("not a number"), TypeDescriptor::Int).is_err());
    }

    #[test]
    fn test_rendering_to_string() {
        assert_eq!(
            convert(Value::int(5), TypeDescriptor::Str).unwrap(),
            Some(Value::string("5"))
        );
        assert_eq!(
            convert(Value::bool(false), TypeDescriptor::Str).unwrap(),
            Some(Value::string("false"))
        );
    }

    #[test]
    fn test_containers_decline() {
        assert_eq!(
            convert(Value::List(vec![]), TypeDescriptor::Str).unwrap(),
            None
        );
    }
}
