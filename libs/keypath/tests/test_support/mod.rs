#![allow(dead_code)]

use callis_keypath::NavigationContext;
use callis_model::{Record, RecordDef, SchemaRegistry, TypeDescriptor, Value};
use std::sync::Arc;

/// Order/Customer/Address schema used across the engine tests.
pub fn order_schema() -> SchemaRegistry {
    SchemaRegistry::new()
        .define(
            "Order",
            RecordDef::new()
                .property("customer", TypeDescriptor::record("Customer"))
                .property("items", TypeDescriptor::list(TypeDescriptor::Int))
                .property("pair", TypeDescriptor::tuple(TypeDescriptor::Int, Some(2)))
                .property("tags", TypeDescriptor::list(TypeDescriptor::Any)),
        )
        .define(
            "Customer",
            RecordDef::new()
                .property("name", TypeDescriptor::Str)
                .property("address", TypeDescriptor::record("Address")),
        )
        .define(
            "Address",
            RecordDef::new().property("street", TypeDescriptor::Str),
        )
}

pub fn order_context() -> NavigationContext {
    NavigationContext::new().with_schema(Arc::new(order_schema()))
}

pub fn empty_order() -> Value {
    Value::Record(Record::new("Order").with_field("items", Value::List(Vec::new())))
}

pub fn json_root(json: serde_json::Value) -> Value {
    Value::from_json(&json).expect("test fixture JSON must convert")
}
