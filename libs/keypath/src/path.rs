//! Path expressions
//!
//! A path is a flat, dot-separated, single-target expression such as
//! `order.customer.address.street`, `items.3.price` or `name.#upper`.
//! Parsing splits on the last separator only; the parent path is itself a
//! path expression, re-parsed as resolution recurses toward the root. The
//! empty string is the self path, denoting the root itself.

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Path segment separator.
pub const SEPARATOR: char = '.';

/// Sigil marking a segment as a named function invocation.
pub const FUNCTION_SIGIL: char = '#';

/// Classification of a path's last segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// The self path: no segments, the root itself.
    Root,
    /// Plain property access by name.
    Property(Arc<str>),
    /// Indexed access into a sequence; the segment is all decimal digits.
    Index(usize),
    /// Named function invocation; the segment starts with [`FUNCTION_SIGIL`].
    Function(Arc<str>),
}

/// A parsed path expression: the full string, its parent path, and the
/// classified last segment. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    full: Arc<str>,
    parent: Option<Arc<str>>,
    segment: Arc<str>,
    kind: SegmentKind,
}

impl PathExpression {
    /// Parse a path string.
    ///
    /// Fails with [`Error::InvalidPath`] on a leading, trailing or doubled
    /// separator, an empty function name, or a malformed numeric segment.
    pub fn parse(path: &str) -> Result<PathExpression> {
        if path.is_empty() {
            return Ok(PathExpression {
                full: Arc::from(""),
                parent: None,
                segment: Arc::from(""),
                kind: SegmentKind::Root,
            });
        }

        if path.starts_with(SEPARATOR) || path.ends_with(SEPARATOR) {
            return Err(Error::InvalidPath(format!(
                "`{}` must not start or end with `{}`",
                path, SEPARATOR
            )));
        }
        if path.contains("..") {
            return Err(Error::InvalidPath(format!(
                "`{}` contains an empty segment",
                path
            )));
        }

        let (parent, segment) = match path.rfind(SEPARATOR) {
            Some(at) => (Some(&path[..at]), &path[at + 1..]),
            None => (None, path),
        };
        let kind = classify_segment(segment, path)?;

        Ok(PathExpression {
            full: Arc::from(path),
            parent: parent.map(Arc::from),
            segment: Arc::from(segment),
            kind,
        })
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    /// The parent path string, `None` for single-segment paths and the root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, SegmentKind::Root)
    }

    /// The parent as a path expression; the root for single-segment paths.
    pub fn parent_expr(&self) -> Result<PathExpression> {
        PathExpression::parse(self.parent.as_deref().unwrap_or(""))
    }

    /// Expressions for every ancestor prefix and for this path itself,
    /// ordered root-first (the root expression is excluded).
    pub fn chain(&self) -> Result<SmallVec<[PathExpression; 8]>> {
        let mut chain = SmallVec::new();
        if self.is_root() {
            return Ok(chain);
        }
        let full: &str = &self.full;
        for (at, _) in full.match_indices(SEPARATOR) {
            chain.push(PathExpression::parse(&full[..at])?);
        }
        chain.push(self.clone());
        Ok(chain)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

fn classify_segment(segment: &str, full: &str) -> Result<SegmentKind> {
    let mut chars = segment.chars();
    match chars.next() {
        None => Err(Error::InvalidPath(format!(
            "`{}` contains an empty segment",
            full
        ))),
        Some(FUNCTION_SIGIL) => {
            let name = chars.as_str();
            if name.is_empty() {
                Err(Error::InvalidPath(format!(
                    "function segment in `{}` has an empty name",
                    full
                )))
            } else {
                Ok(SegmentKind::Function(Arc::from(name)))
            }
        }
        Some(_) if segment.bytes().all(|b| b.is_ascii_digit()) => {
            segment
                .parse::<usize>()
                .map(SegmentKind::Index)
                .map_err(|e| {
                    Error::InvalidPath(format!(
                        "index segment `{}` in `{}`: {}",
                        segment, full, e
                    ))
                })
        }
        Some(first)
            if (first == '+' || first == '-')
                && segment.len() > 1
                && segment[1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            // A signed integer literal is neither an index nor a property name.
            Err(Error::InvalidPath(format!(
                "malformed index segment `{}` in `{}`",
                segment, full
            )))
        }
        Some(_) => Ok(SegmentKind::Property(Arc::from(segment))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_self_path() {
        let expr = PathExpression::parse("").unwrap();
        assert!(expr.is_root());
        assert_eq!(expr.parent(), None);
    }

    #[test]
    fn test_parse_single_property() {
        let expr = PathExpression::parse("name").unwrap();
        assert_eq!(expr.parent(), None);
        assert_eq!(expr.segment(), "name");
        assert!(matches!(expr.kind(), SegmentKind::Property(p) if p.as_ref() == "name"));
    }

    #[test]
    fn test_parse_splits_on_last_separator() {
        let expr = PathExpression::parse("a.b.2.#f").unwrap();
        assert_eq!(expr.parent(), Some("a.b.2"));
        assert_eq!(expr.segment(), "#f");
        assert!(matches!(expr.kind(), SegmentKind::Function(n) if n.as_ref() == "f"));

        let parent = expr.parent_expr().unwrap();
        assert_eq!(parent.parent(), Some("a.b"));
        assert!(matches!(parent.kind(), SegmentKind::Index(2)));
    }

    #[test]
    fn test_parse_index() {
        let expr = PathExpression::parse("items.3").unwrap();
        assert!(matches!(expr.kind(), SegmentKind::Index(3)));
    }

    #[test]
    fn test_invalid_separators() {
        assert!(PathExpression::parse(".a").is_err());
        assert!(PathExpression::parse("a.").is_err());
        assert!(PathExpression::parse("a..b").is_err());
        assert!(PathExpression::parse(".").is_err());
    }

    #[test]
    fn test_invalid_numeric_segments() {
        assert!(PathExpression::parse("items.+3").is_err());
        assert!(PathExpression::parse("items.-1").is_err());
        assert!(PathExpression::parse("items.3x").is_ok()); // property, not index
        assert!(matches!(
            PathExpression::parse("items.3x").unwrap().kind(),
            SegmentKind::Property(_)
        ));
        // Larger than usize: the parse failure surfaces as an invalid path.
        assert!(PathExpression::parse("items.99999999999999999999999999").is_err());
    }

    #[test]
    fn test_empty_function_name() {
        assert!(PathExpression::parse("a.#").is_err());
    }

    #[test]
    fn test_chain_order() {
        let chain = PathExpression::parse("a.b.c").unwrap().chain().unwrap();
        let paths: Vec<&str> = chain.iter().map(|e| e.full()).collect();
        assert_eq!(paths, vec!["a", "a.b", "a.b.c"]);
    }
}
