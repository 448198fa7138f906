//! Conversion bridge
//!
//! Whenever a resolved value's runtime type does not satisfy a requested
//! descriptor, the bridge tries the context's converter, then the
//! process-wide default. A converter may decline (falling through to the
//! next stage); an outright failure, or a result that still does not satisfy
//! the target, surfaces as a conversion error carrying the source path.

use crate::context::NavigationContext;
use crate::error::{Error, Result};
use callis_model::{Converter, DefaultConverter, TypeDescriptor, Value};

pub(crate) fn convert_to(
    value: Value,
    path: &str,
    target: &TypeDescriptor,
    ctx: &NavigationContext,
) -> Result<Value> {
    if target.is_satisfied_by(&value) {
        return Ok(value);
    }

    let conversion_error = |value: &Value| Error::Conversion {
        path: path.to_string(),
        from: value.type_descriptor().to_string(),
        to: target.to_string(),
    };

    if let Some(converter) = ctx.converter() {
        match converter.convert(&value, target) {
            Ok(Some(converted)) if target.is_satisfied_by(&converted) => return Ok(converted),
            Ok(Some(_)) | Err(_) => return Err(conversion_error(&value)),
            Ok(None) => {}
        }
    }

    match DefaultConverter.convert(&value, target) {
        Ok(Some(converted)) if target.is_satisfied_by(&converted) => Ok(converted),
        _ => Err(conversion_error(&value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_satisfied_values_pass_through() {
        let ctx = NavigationContext::new();
        let value = Value::int(1);
        assert_eq!(
            convert_to(value.clone(), "a", &TypeDescriptor::Int, &ctx).unwrap(),
            value
        );
        // Numeric equivalence: no conversion performed.
        assert_eq!(
            convert_to(Value::int(1), "a", &TypeDescriptor::Decimal, &ctx).unwrap(),
            Value::int(1)
        );
    }

    #[test]
    fn test_default_converter_fallback() {
        let ctx = NavigationContext::new();
        assert_eq!(
            convert_to(Value::string("42"), "a", &TypeDescriptor::Int, &ctx).unwrap(),
            Value::int(42)
        );
    }

    #[test]
    fn test_context_converter_runs_first() {
        struct FortyTwo;
        impl Converter for FortyTwo {
            fn convert(
                &self,
                _value: &Value,
                target: &TypeDescriptor,
            ) -> callis_model::Result<Option<Value>> {
                Ok((*target == TypeDescriptor::Int).then_some(Value::int(42)))
            }
        }

        let ctx = NavigationContext::new().with_converter(Arc::new(FortyTwo));
        assert_eq!(
            convert_to(Value::string("7"), "a", &TypeDescriptor::Int, &ctx).unwrap(),
            Value::int(42)
        );
    }

    #[test]
    fn test_unsatisfying_result_is_an_error() {
        struct Stubborn;
        impl Converter for Stubborn {
            fn convert(
                &self,
                value: &Value,
                _target: &TypeDescriptor,
            ) -> callis_model::Result<Option<Value>> {
                Ok(Some(value.clone()))
            }
        }

        let ctx = NavigationContext::new().with_converter(Arc::new(Stubborn));
        let err = convert_to(Value::List(vec![]), "a.b", &TypeDescriptor::Int, &ctx).unwrap_err();
        assert!(matches!(err, Error::Conversion { path, .. } if path == "a.b"));
    }

    #[test]
    fn test_unconvertible_reports_path_and_types() {
        let ctx = NavigationContext::new();
        let err =
            convert_to(Value::string("xyz"), "a.b", &TypeDescriptor::Int, &ctx).unwrap_err();
        match err {
            Error::Conversion { path, from, to } => {
                assert_eq!(path, "a.b");
                assert_eq!(from, "Str");
                assert_eq!(to, "Int");
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
    }
}
