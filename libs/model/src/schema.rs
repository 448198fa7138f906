//! Schema provider: declared property types for record values
//!
//! The engine needs to know what type a record property is declared as, both
//! for auto-creating missing values and for type-only path resolution. That
//! knowledge lives behind the `SchemaProvider` trait so callers can plug in
//! their own introspection layer; `SchemaRegistry` is the in-process default.

use crate::types::TypeDescriptor;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of declared property types, keyed by record type name.
pub trait SchemaProvider: Send + Sync {
    /// Declared type of `property` on the record type `record`, or `None`
    /// when the type or the property is not known to this provider.
    fn property_type(&self, record: &str, property: &str) -> Option<TypeDescriptor>;

    /// Declared property names of `record`, or `None` for an unknown type.
    fn property_names(&self, record: &str) -> Option<Vec<Arc<str>>> {
        let _ = record;
        None
    }
}

/// A record type definition: ordered property declarations.
#[derive(Debug, Clone, Default)]
pub struct RecordDef {
    properties: Vec<(Arc<str>, TypeDescriptor)>,
}

impl RecordDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property. Redeclaring a name replaces the earlier entry.
    pub fn property(mut self, name: impl Into<Arc<str>>, ty: TypeDescriptor) -> Self {
        let name = name.into();
        self.properties.retain(|(n, _)| *n != name);
        self.properties.push((name, ty));
        self
    }

    pub fn property_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.properties
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, ty)| ty)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.properties.iter().map(|(n, _)| n)
    }
}

/// In-process schema registry, the default `SchemaProvider`.
///
/// An empty registry knows nothing: every record is opaque, which makes all
/// record properties untyped and type-only queries over them unsafe.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    records: HashMap<Arc<str>, RecordDef>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type definition under `name`.
    pub fn define(mut self, name: impl Into<Arc<str>>, def: RecordDef) -> Self {
        self.records.insert(name.into(), def);
        self
    }

    pub fn record(&self, name: &str) -> Option<&RecordDef> {
        self.records.get(name)
    }
}

impl SchemaProvider for SchemaRegistry {
    fn property_type(&self, record: &str, property: &str) -> Option<TypeDescriptor> {
        self.records
            .get(record)
            .and_then(|def| def.property_type(property))
            .cloned()
    }

    fn property_names(&self, record: &str) -> Option<Vec<Arc<str>>> {
        self.records
            .get(record)
            .map(|def| def.property_names().cloned().collect())
    }
}
