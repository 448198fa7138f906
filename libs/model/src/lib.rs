//! Dynamic object model for the Callis navigation engine
//!
//! This crate provides the graph the engine navigates and the three
//! collaborator contracts it consumes:
//!
//! - [`Value`]: a dynamic object graph (scalars, sequences, mappings, typed
//!   records) with JSON interop
//! - [`TypeDescriptor`] + [`SchemaProvider`]: static type information for
//!   record properties, supplied by the caller
//! - [`ObjectFactory`]: instantiation of a value from its descriptor
//! - [`Converter`]: coercion of a value to a requested descriptor

pub mod convert;
pub mod error;
pub mod factory;
pub mod schema;
pub mod types;
pub mod value;

pub use convert::{Converter, DefaultConverter};
pub use error::{Error, Result};
pub use factory::{DefaultFactory, ObjectFactory};
pub use schema::{RecordDef, SchemaProvider, SchemaRegistry};
pub use types::{Shape, TypeDescriptor};
pub use value::{Record, Value};
