//! Navigation context
//!
//! The context carries everything mutable or pluggable across a session of
//! path operations: the shared per-root cache store, the converter, the
//! object factory, the function registry, the schema provider and an
//! optional observer. The engine itself holds no state between calls.
//!
//! A context is not internally synchronized for concurrent use; distinct
//! contexts are fully independent.

use crate::functions::{FunctionRegistry, PathFunction};
use crate::graph::{CacheGraph, GraphStore, ResolvedNode, RootKey};
use callis_model::{
    Converter, DefaultFactory, ObjectFactory, SchemaProvider, SchemaRegistry,
};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Callback invoked with every freshly resolved node, for auditing.
pub type NodeObserver = Box<dyn Fn(&ResolvedNode) + Send + Sync>;

/// How many per-root cache graphs the shared store retains.
const DEFAULT_ROOT_CAPACITY: usize = 64;

/// Caller-supplied state for a session of path operations.
pub struct NavigationContext {
    cache: Option<Mutex<GraphStore>>,
    converter: Option<Arc<dyn Converter>>,
    factory: Arc<dyn ObjectFactory>,
    functions: FunctionRegistry,
    schema: Arc<dyn SchemaProvider>,
    observer: Option<NodeObserver>,
}

impl NavigationContext {
    /// Context with caching enabled and default collaborators.
    pub fn new() -> Self {
        Self {
            cache: Some(Mutex::new(GraphStore::new(
                NonZeroUsize::new(DEFAULT_ROOT_CAPACITY).expect("capacity is non-zero"),
            ))),
            converter: None,
            factory: Arc::new(DefaultFactory),
            functions: FunctionRegistry::new(),
            schema: Arc::new(SchemaRegistry::new()),
            observer: None,
        }
    }

    /// Context with caching disabled: every call resolves against a
    /// throwaway graph that is discarded when the call returns.
    pub fn uncached() -> Self {
        Self {
            cache: None,
            ..Self::new()
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn with_factory(mut self, factory: Arc<dyn ObjectFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_schema(mut self, schema: Arc<dyn SchemaProvider>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Register a single function, keeping the rest of the registry.
    pub fn with_function(
        mut self,
        name: impl Into<Arc<str>>,
        function: Arc<dyn PathFunction>,
    ) -> Self {
        self.functions.register(name, function);
        self
    }

    pub fn with_observer(
        mut self,
        observer: impl Fn(&ResolvedNode) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn caching_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn converter(&self) -> Option<&Arc<dyn Converter>> {
        self.converter.as_ref()
    }

    pub fn factory(&self) -> &dyn ObjectFactory {
        self.factory.as_ref()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn schema(&self) -> &dyn SchemaProvider {
        self.schema.as_ref()
    }

    pub(crate) fn observer(&self) -> Option<&NodeObserver> {
        self.observer.as_ref()
    }

    /// Take this root's graph out of the shared store for the duration of a
    /// call. Absent cache or absent entry both yield `None`.
    pub(crate) fn take_graph(&self, key: &RootKey) -> Option<CacheGraph> {
        let cache = self.cache.as_ref()?;
        cache.lock().unwrap().pop(key)
    }

    /// Return a graph to the shared store after a call.
    pub(crate) fn store_graph(&self, key: RootKey, graph: CacheGraph) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap().put(key, graph);
        }
    }
}

impl Default for NavigationContext {
    fn default() -> Self {
        Self::new()
    }
}
