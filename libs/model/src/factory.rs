//! Object factory: instantiating a value from its descriptor
//!
//! Auto-vivification needs to conjure a value for a declared type. The
//! factory is swappable per context; the default builds the zero value for
//! every constructible descriptor.

use crate::error::{Error, Result};
use crate::types::TypeDescriptor;
use crate::value::{Record, Value};
use rust_decimal::Decimal;

/// Instantiates a value for a type descriptor.
pub trait ObjectFactory: Send + Sync {
    fn create(&self, ty: &TypeDescriptor) -> Result<Value>;
}

/// Zero-value construction strategy.
///
/// Scalars get their zero/empty value, containers start empty, records start
/// with no fields. `Any` carries no construction recipe and fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl ObjectFactory for DefaultFactory {
    fn create(&self, ty: &TypeDescriptor) -> Result<Value> {
        match ty {
            TypeDescriptor::Any => Err(Error::Unconstructible(ty.to_string())),
            TypeDescriptor::Bool => Ok(Value::Bool(false)),
            TypeDescriptor::Int => Ok(Value::Int(0)),
            TypeDescriptor::Decimal => Ok(Value::Decimal(Decimal::ZERO)),
            TypeDescriptor::Str => Ok(Value::string("")),
            TypeDescriptor::List(_) => Ok(Value::List(Vec::new())),
            TypeDescriptor::Tuple(elem, len) => {
                // A fixed sequence of unknown length has no zero value.
                let len = len.ok_or_else(|| Error::Unconstructible(ty.to_string()))?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.create(elem)?);
                }
                Ok(Value::Tuple(items.into_boxed_slice()))
            }
            TypeDescriptor::Bag(_) => Ok(Value::Bag(Vec::new())),
            TypeDescriptor::Map(_) => Ok(Value::Map(Default::default())),
            TypeDescriptor::Record(name) => Ok(Value::Record(Record::new(name.clone()))),
        }
    }
}
