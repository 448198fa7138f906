//! Navigation engine
//!
//! Resolves a path expression against a root value (or a root type), one
//! segment at a time: the parent path is resolved first, recursively, then
//! the last segment is dispatched on the parent's shape. Results are
//! memoized per root in a cache graph; writes go through an in-place
//! location walk when every step is a concrete location, and otherwise
//! rebuild the parent and store it back through a recursive write on the
//! parent path.

use crate::context::NavigationContext;
use crate::convert::convert_to;
use crate::error::{Error, Result};
use crate::functions::PathFunction;
use crate::graph::{CacheGraph, NodeId, RootKey};
use crate::path::{PathExpression, SegmentKind};
use callis_model::{Shape, TypeDescriptor, Value};
use std::sync::Arc;

/// Suffix of the derived cache key holding the ordered view of an unordered
/// collection.
pub const SEQ_VIEW_SUFFIX: &str = "__seq_view";

/// What to do when an intermediate value is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Stop and yield absence.
    Lenient,
    /// Raise [`Error::MissingSegment`].
    Strict,
    /// Synthesize and attach a new intermediate value (auto-vivification).
    Create,
}

/// Per-call navigation front end borrowing a [`NavigationContext`].
pub struct Navigator<'c> {
    ctx: &'c NavigationContext,
}

/// State threaded through one resolution call tree.
struct Session {
    key: Option<RootKey>,
    graph: CacheGraph,
    caching: bool,
    mode: NavigationMode,
    root_type: TypeDescriptor,
    root_desc: String,
}

enum Write {
    Done(Option<Value>),
    Skipped,
}

impl<'c> Navigator<'c> {
    pub fn new(ctx: &'c NavigationContext) -> Self {
        Self { ctx }
    }

    /// Resolve `path` against `root`.
    ///
    /// An absent root yields absence under [`NavigationMode::Lenient`] and
    /// [`Error::NullRoot`] otherwise. Under [`NavigationMode::Create`],
    /// missing intermediates are materialized in the live root.
    pub fn get(
        &self,
        root: Option<&mut Value>,
        path: &str,
        mode: NavigationMode,
    ) -> Result<Option<Value>> {
        let expr = PathExpression::parse(path)?;
        let Some(root) = root else {
            return match mode {
                NavigationMode::Lenient => Ok(None),
                _ => Err(Error::NullRoot {
                    path: path.to_string(),
                }),
            };
        };

        let mut session = self.begin_value(root, mode);
        let result = self.resolve_value(root, &expr, &mut session);
        self.finish(session);
        result
    }

    /// [`Navigator::get`], then the conversion bridge on the final value.
    pub fn get_typed(
        &self,
        root: Option<&mut Value>,
        path: &str,
        mode: NavigationMode,
        target: &TypeDescriptor,
    ) -> Result<Option<Value>> {
        match self.get(root, path, mode)? {
            Some(value) => convert_to(value, path, target, self.ctx).map(Some),
            None => Ok(None),
        }
    }

    /// Write `value` at `path`, resolving the parent with the same recursion
    /// as [`Navigator::get`] and returning the previous value.
    ///
    /// The written path is evicted from the cache rather than patched in
    /// place; a later read re-derives it from the live root.
    pub fn set(
        &self,
        root: Option<&mut Value>,
        path: &str,
        mode: NavigationMode,
        value: Value,
    ) -> Result<Option<Value>> {
        let expr = PathExpression::parse(path)?;
        if expr.is_root() {
            return Err(Error::InvalidPath(
                "cannot write to the root path".to_string(),
            ));
        }
        let Some(root) = root else {
            return match mode {
                NavigationMode::Lenient => Ok(None),
                _ => Err(Error::NullRoot {
                    path: path.to_string(),
                }),
            };
        };

        let mut session = self.begin_value(root, mode);
        let result = self.set_value(root, &expr, value, &mut session);
        self.finish(session);
        result
    }

    /// Resolve the static type of `path` starting from `root_type`, without
    /// an instance. A step whose parent type cannot be determined is unsafe:
    /// an error when `fail_on_unsafe`, absence otherwise. Never materializes
    /// or mutates anything.
    pub fn get_type(
        &self,
        root_type: &TypeDescriptor,
        path: &str,
        fail_on_unsafe: bool,
    ) -> Result<Option<TypeDescriptor>> {
        let expr = PathExpression::parse(path)?;
        let mut session = self.begin_type(root_type);
        let result = self.resolve_static_type(&expr, fail_on_unsafe, &mut session);
        self.finish(session);
        result
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    fn begin_value(&self, root: &Value, mode: NavigationMode) -> Session {
        let root_type = root.type_descriptor();
        let root_desc = root_type.to_string();
        if !self.ctx.caching_enabled() {
            return Session {
                key: None,
                graph: CacheGraph::detached(),
                caching: false,
                mode,
                root_type,
                root_desc,
            };
        }

        let key = RootKey::Instance(root.identity_hash());
        let content = root.content_hash();
        let graph = match self.ctx.take_graph(&key) {
            Some(mut graph) => {
                if graph.content_hash() != content {
                    graph.sweep(content);
                }
                graph
            }
            None => {
                tracing::trace!(root = %root_desc, "creating cache graph");
                CacheGraph::new(content)
            }
        };
        let caching = graph.is_enabled();
        Session {
            key: Some(key),
            graph,
            caching,
            mode,
            root_type,
            root_desc,
        }
    }

    fn begin_type(&self, root_type: &TypeDescriptor) -> Session {
        let root_desc = root_type.to_string();
        if !self.ctx.caching_enabled() {
            return Session {
                key: None,
                graph: CacheGraph::detached(),
                caching: false,
                mode: NavigationMode::Lenient,
                root_type: root_type.clone(),
                root_desc,
            };
        }

        let key = RootKey::Type(Arc::from(root_desc.as_str()));
        let graph = self
            .ctx
            .take_graph(&key)
            .unwrap_or_else(|| CacheGraph::new(0));
        let caching = graph.is_enabled();
        Session {
            key: Some(key),
            graph,
            caching,
            mode: NavigationMode::Lenient,
            root_type: root_type.clone(),
            root_desc,
        }
    }

    /// Return the session's graph to the shared store. The recorded content
    /// hash is intentionally left as it was at session start: if this call
    /// mutated the root, the next session's hash comparison sweeps every
    /// cached value instead of serving stale snapshots.
    fn finish(&self, session: Session) {
        if let Some(key) = session.key {
            self.ctx.store_graph(key, session.graph);
        }
    }

    fn notify(&self, session: &Session, id: NodeId) {
        if let Some(observer) = self.ctx.observer() {
            observer(session.graph.node(id));
        }
    }

    // ========================================================================
    // Value resolution
    // ========================================================================

    fn resolve_value(
        &self,
        root: &mut Value,
        expr: &PathExpression,
        st: &mut Session,
    ) -> Result<Option<Value>> {
        if st.caching {
            if let Some(value) = st.graph.cached_value(expr.full()) {
                return Ok(Some(value.clone()));
            }
        }

        if expr.is_root() {
            let value = root.clone();
            let id = st.graph.intern(expr);
            st.graph.record_value(id, value.clone());
            self.notify(st, id);
            return Ok(Some(value));
        }

        tracing::trace!(path = expr.full(), "resolving");
        let parent_expr = expr.parent_expr()?;
        let parent = self.resolve_value(root, &parent_expr, st)?;
        let Some(parent) = parent else {
            // Under Create the parent was materialized when it was resolved,
            // so an absent parent only reaches here in the other two modes.
            return match st.mode {
                NavigationMode::Lenient => Ok(None),
                _ => Err(Error::MissingSegment {
                    path: expr.full().to_string(),
                }),
            };
        };

        let child = self.resolve_child(root, expr, &parent, st)?;

        if let Some(value) = &child {
            let id = st.graph.intern(expr);
            st.graph.record_value(id, value.clone());
            self.notify(st, id);
        }
        Ok(child)
    }

    fn resolve_child(
        &self,
        root: &mut Value,
        expr: &PathExpression,
        parent: &Value,
        st: &mut Session,
    ) -> Result<Option<Value>> {
        if let SegmentKind::Function(name) = expr.kind() {
            let name = name.clone();
            return self.invoke_function_get(expr, &name, parent, st);
        }

        let existing = match (expr.kind(), parent) {
            (SegmentKind::Property(name), Value::Record(record)) => record.field(name).cloned(),
            (SegmentKind::Property(_) | SegmentKind::Index(_), Value::Map(entries)) => {
                entries.get(expr.segment()).cloned()
            }
            (SegmentKind::Index(i), Value::List(items)) => items.get(*i).cloned(),
            (SegmentKind::Index(i), Value::Tuple(items)) => items.get(*i).cloned(),
            (SegmentKind::Index(i), Value::Bag(items)) => {
                let bag_path = expr.parent().unwrap_or("").to_string();
                let view = self.obtain_view(&bag_path, items, st)?;
                view.get(*i).cloned()
            }
            _ => {
                // The segment kind does not apply to the parent's shape.
                return match st.mode {
                    NavigationMode::Lenient => Ok(None),
                    NavigationMode::Strict => Err(Error::MissingSegment {
                        path: expr.full().to_string(),
                    }),
                    NavigationMode::Create => Err(Error::Creation {
                        path: expr.full().to_string(),
                        root: st.root_desc.clone(),
                        reason: format!(
                            "a {} value cannot host segment `{}`",
                            parent.type_descriptor(),
                            expr.segment()
                        ),
                    }),
                };
            }
        };

        match existing {
            Some(value) => Ok(Some(value)),
            None if st.mode == NavigationMode::Create => {
                let declared = self.declared_type(expr, st)?;
                let child = match &declared {
                    Some(ty) => self.create_value(Some(ty), expr, st)?,
                    // An untyped mapping vivifies like-for-like: the missing
                    // entry becomes an empty mapping.
                    None if parent.shape() == Shape::Mapping => self.create_value(
                        Some(&TypeDescriptor::map(TypeDescriptor::Any)),
                        expr,
                        st,
                    )?,
                    None => self.create_value(None, expr, st)?,
                };
                self.store_value(root, expr, child.clone(), st)?;
                Ok(Some(child))
            }
            None => Ok(None),
        }
    }

    fn invoke_function_get(
        &self,
        expr: &PathExpression,
        name: &str,
        parent: &Value,
        st: &mut Session,
    ) -> Result<Option<Value>> {
        let function = self.resolve_function(name, expr, st)?;

        let input_type = function.input_type();
        let input = if input_type.is_any() {
            parent.clone()
        } else {
            convert_to(
                parent.clone(),
                expr.parent().unwrap_or(""),
                &input_type,
                self.ctx,
            )?
        };

        let mut result = function.get(&input, name, self.ctx)?;
        if result.is_none() && st.mode == NavigationMode::Create {
            result = function.create(&input, name, self.ctx)?;
            if result.is_none() {
                // A create that validly yields nothing still cannot satisfy
                // auto-vivification.
                return Err(Error::Creation {
                    path: expr.full().to_string(),
                    root: st.root_desc.clone(),
                    reason: format!("function `{}` produced no value", name),
                });
            }
        }
        Ok(result)
    }

    fn resolve_function(
        &self,
        name: &str,
        expr: &PathExpression,
        st: &mut Session,
    ) -> Result<Arc<dyn PathFunction>> {
        let function =
            self.ctx
                .functions()
                .resolve(name)
                .ok_or_else(|| Error::UnknownFunction {
                    name: name.to_string(),
                    path: expr.full().to_string(),
                })?;
        if !function.is_deterministic() {
            tracing::debug!(
                function = name,
                "non-deterministic function, disabling caching for this root"
            );
            st.caching = false;
            st.graph.disable();
        }
        Ok(function)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    fn set_value(
        &self,
        root: &mut Value,
        expr: &PathExpression,
        value: Value,
        st: &mut Session,
    ) -> Result<Option<Value>> {
        let parent_expr = expr.parent_expr()?;
        let Some(mut parent) = self.resolve_value(root, &parent_expr, st)? else {
            return match st.mode {
                NavigationMode::Lenient => Ok(None),
                _ => Err(Error::MissingSegment {
                    path: expr.full().to_string(),
                }),
            };
        };

        // Convert to the declared type when one is known. Function segments
        // hand the raw value to the function instead.
        let declared = self.declared_type(expr, st)?;
        let value = match &declared {
            Some(target) => convert_to(value, expr.full(), target, self.ctx)?,
            None => value,
        };

        let outcome = self.write_into_parent(&mut parent, expr, value, declared.as_ref(), st)?;
        let Write::Done(previous) = outcome else {
            return Ok(None);
        };

        self.store_value(root, &parent_expr, parent, st)?;
        st.graph.evict_value(expr.full());
        Ok(previous)
    }

    /// Write `value` at `expr` in the live root.
    ///
    /// Fast path: an in-place walk when every step is a concrete location.
    /// Otherwise the parent is re-derived, modified, and stored back through
    /// a recursive write on the parent path, so replacements of fixed or
    /// adapted containers propagate explicitly toward the root.
    fn store_value(
        &self,
        root: &mut Value,
        expr: &PathExpression,
        value: Value,
        st: &mut Session,
    ) -> Result<()> {
        if expr.is_root() {
            *root = value;
            return Ok(());
        }
        if let Some(slot) = locate_slot(root, expr)? {
            *slot = value;
            return Ok(());
        }

        let parent_expr = expr.parent_expr()?;
        let Some(mut parent) = self.resolve_value(root, &parent_expr, st)? else {
            return Err(Error::MissingSegment {
                path: expr.full().to_string(),
            });
        };
        let declared = self.declared_type(expr, st)?;
        match self.write_into_parent(&mut parent, expr, value, declared.as_ref(), st)? {
            Write::Done(_) => self.store_value(root, &parent_expr, parent, st),
            Write::Skipped => Ok(()),
        }
    }

    fn write_into_parent(
        &self,
        parent: &mut Value,
        expr: &PathExpression,
        value: Value,
        declared: Option<&TypeDescriptor>,
        st: &mut Session,
    ) -> Result<Write> {
        let kind = expr.kind().clone();

        if let SegmentKind::Function(name) = &kind {
            let function = self.resolve_function(name, expr, st)?;
            let previous = function.set(parent, name, value, self.ctx)?;
            return Ok(Write::Done(previous));
        }
        if matches!(kind, SegmentKind::Root) {
            return Err(Error::InvalidPath(
                "cannot write to the root path".to_string(),
            ));
        }

        let parent_desc = parent.type_descriptor();
        match parent {
            Value::Map(entries) => Ok(Write::Done(
                entries.insert(Arc::from(expr.segment()), value),
            )),
            Value::Record(record) => match &kind {
                SegmentKind::Property(name) => {
                    Ok(Write::Done(record.set_field(name.clone(), value)))
                }
                _ => self.write_mismatch(expr, &parent_desc, st),
            },
            Value::List(items) => {
                let SegmentKind::Index(i) = kind else {
                    return self.write_mismatch(expr, &parent_desc, st);
                };
                if i < items.len() {
                    return Ok(Write::Done(Some(std::mem::replace(&mut items[i], value))));
                }
                match st.mode {
                    NavigationMode::Create => {
                        while items.len() < i {
                            items.push(self.create_value(declared, expr, st)?);
                        }
                        items.push(value);
                        Ok(Write::Done(None))
                    }
                    NavigationMode::Strict => Err(Error::MissingSegment {
                        path: expr.full().to_string(),
                    }),
                    NavigationMode::Lenient => Ok(Write::Skipped),
                }
            }
            Value::Tuple(items) => {
                let SegmentKind::Index(i) = kind else {
                    return self.write_mismatch(expr, &parent_desc, st);
                };
                if i < items.len() {
                    return Ok(Write::Done(Some(std::mem::replace(&mut items[i], value))));
                }
                match st.mode {
                    NavigationMode::Create => {
                        // Fixed-size storage cannot grow: produce a new
                        // container, to be written back into the grandparent.
                        let mut grown = items.to_vec();
                        while grown.len() < i {
                            grown.push(self.create_value(declared, expr, st)?);
                        }
                        grown.push(value);
                        *parent = Value::Tuple(grown.into_boxed_slice());
                        Ok(Write::Done(None))
                    }
                    NavigationMode::Strict => Err(Error::MissingSegment {
                        path: expr.full().to_string(),
                    }),
                    NavigationMode::Lenient => Ok(Write::Skipped),
                }
            }
            Value::Bag(items) => {
                let SegmentKind::Index(i) = kind else {
                    return self.write_mismatch(expr, &parent_desc, st);
                };
                if !st.caching {
                    return Err(Error::CachingRequired {
                        path: expr.full().to_string(),
                    });
                }
                let bag_path = expr.parent().unwrap_or("").to_string();
                let mut view = self.obtain_view(&bag_path, items, st)?;
                let previous = if i < view.len() {
                    Some(std::mem::replace(&mut view[i], value))
                } else {
                    match st.mode {
                        NavigationMode::Create => {
                            while view.len() < i {
                                view.push(self.create_value(declared, expr, st)?);
                            }
                            view.push(value);
                            None
                        }
                        NavigationMode::Strict => {
                            return Err(Error::MissingSegment {
                                path: expr.full().to_string(),
                            })
                        }
                        NavigationMode::Lenient => return Ok(Write::Skipped),
                    }
                };
                let view_expr = PathExpression::parse(&seq_view_path(&bag_path))?;
                let id = st.graph.intern(&view_expr);
                st.graph.record_value(id, Value::List(view.clone()));
                *parent = Value::Bag(view);
                Ok(Write::Done(previous))
            }
            _ => self.write_mismatch(expr, &parent_desc, st),
        }
    }

    fn write_mismatch(
        &self,
        expr: &PathExpression,
        parent_desc: &TypeDescriptor,
        st: &Session,
    ) -> Result<Write> {
        match st.mode {
            NavigationMode::Lenient => Ok(Write::Skipped),
            NavigationMode::Strict => Err(Error::MissingSegment {
                path: expr.full().to_string(),
            }),
            NavigationMode::Create => Err(Error::Creation {
                path: expr.full().to_string(),
                root: st.root_desc.clone(),
                reason: format!(
                    "a {} value cannot host segment `{}`",
                    parent_desc,
                    expr.segment()
                ),
            }),
        }
    }

    // ========================================================================
    // Collection adaptation
    // ========================================================================

    /// Ordered view over an unordered collection, cached under a key derived
    /// from the owning path. With caching disabled the view is an ephemeral
    /// snapshot, which is fine for reads; writes check `st.caching` first.
    fn obtain_view(
        &self,
        bag_path: &str,
        items: &[Value],
        st: &mut Session,
    ) -> Result<Vec<Value>> {
        if !st.caching {
            return Ok(items.to_vec());
        }
        let view_path = seq_view_path(bag_path);
        if let Some(Value::List(view)) = st.graph.cached_value(&view_path) {
            return Ok(view.clone());
        }
        let view = items.to_vec();
        let id = st.graph.intern(&PathExpression::parse(&view_path)?);
        st.graph.record_value(id, Value::List(view.clone()));
        Ok(view)
    }

    // ========================================================================
    // Static types
    // ========================================================================

    /// Declared type of the location `expr`, from the static type chain.
    /// `None` when unknown; function segments manage their own values.
    fn declared_type(
        &self,
        expr: &PathExpression,
        st: &mut Session,
    ) -> Result<Option<TypeDescriptor>> {
        if matches!(expr.kind(), SegmentKind::Function(_)) {
            return Ok(None);
        }
        self.resolve_static_type(expr, false, st)
    }

    fn resolve_static_type(
        &self,
        expr: &PathExpression,
        fail_on_unsafe: bool,
        st: &mut Session,
    ) -> Result<Option<TypeDescriptor>> {
        if st.caching {
            if let Some(ty) = st.graph.cached_static_type(expr.full()) {
                return Ok(Some(ty.clone()));
            }
        }

        if expr.is_root() {
            let root_type = st.root_type.clone();
            if root_type.is_any() {
                return self.unsafe_step(expr, fail_on_unsafe);
            }
            let id = st.graph.intern(expr);
            st.graph.record_static_type(id, root_type.clone());
            self.notify(st, id);
            return Ok(Some(root_type));
        }

        let parent_expr = expr.parent_expr()?;
        let Some(parent_type) = self.resolve_static_type(&parent_expr, fail_on_unsafe, st)? else {
            return Ok(None);
        };

        let step = match (expr.kind(), &parent_type) {
            (SegmentKind::Function(name), _) => {
                let function =
                    self.ctx
                        .functions()
                        .resolve(name)
                        .ok_or_else(|| Error::UnknownFunction {
                            name: name.to_string(),
                            path: expr.full().to_string(),
                        })?;
                Some(function.value_type())
            }
            (SegmentKind::Property(name), TypeDescriptor::Record(record)) => {
                self.ctx.schema().property_type(record, name)
            }
            (SegmentKind::Property(_) | SegmentKind::Index(_), TypeDescriptor::Map(value_ty)) => {
                Some((**value_ty).clone())
            }
            (SegmentKind::Index(_), _) => parent_type.element_type().cloned(),
            _ => None,
        };

        match step.filter(|ty| !ty.is_any()) {
            Some(ty) => {
                let id = st.graph.intern(expr);
                st.graph.record_static_type(id, ty.clone());
                self.notify(st, id);
                Ok(Some(ty))
            }
            None => self.unsafe_step(expr, fail_on_unsafe),
        }
    }

    fn unsafe_step(
        &self,
        expr: &PathExpression,
        fail_on_unsafe: bool,
    ) -> Result<Option<TypeDescriptor>> {
        if fail_on_unsafe {
            Err(Error::UnsafePath {
                path: expr.full().to_string(),
            })
        } else {
            Ok(None)
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    fn create_value(
        &self,
        declared: Option<&TypeDescriptor>,
        expr: &PathExpression,
        st: &Session,
    ) -> Result<Value> {
        let ty = declared.unwrap_or(&TypeDescriptor::Any);
        self.ctx.factory().create(ty).map_err(|e| Error::Creation {
            path: expr.full().to_string(),
            root: st.root_desc.clone(),
            reason: e.to_string(),
        })
    }
}

fn seq_view_path(bag_path: &str) -> String {
    if bag_path.is_empty() {
        SEQ_VIEW_SUFFIX.to_string()
    } else {
        format!("{}.{}", bag_path, SEQ_VIEW_SUFFIX)
    }
}

/// Walk `root` toward `expr` through concrete locations only: present record
/// fields, present mapping keys, in-range sequence indexes. Any other step
/// (a function, an unordered collection, a missing or out-of-range entry)
/// yields `None` and callers fall back to the replace-in-parent path.
fn locate_slot<'v>(root: &'v mut Value, expr: &PathExpression) -> Result<Option<&'v mut Value>> {
    let chain = expr.chain()?;
    let mut cur = root;
    for link in chain.iter() {
        let next = match (link.kind(), cur) {
            (SegmentKind::Property(name), Value::Record(record)) => record.field_mut(name),
            (SegmentKind::Property(_) | SegmentKind::Index(_), Value::Map(entries)) => {
                entries.get_mut(link.segment())
            }
            (SegmentKind::Index(i), Value::List(items)) => items.get_mut(*i),
            (SegmentKind::Index(i), Value::Tuple(items)) => items.get_mut(*i),
            _ => None,
        };
        match next {
            Some(value) => cur = value,
            None => return Ok(None),
        }
    }
    Ok(Some(cur))
}
