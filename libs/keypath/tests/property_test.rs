//! Property-based tests using QuickCheck

use callis_keypath::{NavigationContext, NavigationMode, Navigator, PathExpression, SegmentKind};
use callis_model::Value;
use quickcheck::{QuickCheck, TestResult};
use serde_json::json;

mod test_support;

use test_support::json_root;

/// Property: parsing preserves the full path and classifies each segment by
/// its spelling. Segments are derived from bytes so every generated case is
/// valid syntax.
fn parse_round_trip(raw: Vec<u8>) -> TestResult {
    if raw.is_empty() || raw.len() > 8 {
        return TestResult::discard();
    }

    let segments: Vec<String> = raw
        .iter()
        .map(|b| {
            if b % 2 == 0 {
                b.to_string()
            } else {
                format!("p{}", b)
            }
        })
        .collect();
    let path = segments.join(".");

    let expr = match PathExpression::parse(&path) {
        Ok(expr) => expr,
        Err(_) => return TestResult::failed(),
    };
    if expr.full() != path || expr.segment() != segments[segments.len() - 1] {
        return TestResult::failed();
    }

    let expected_kind = if segments[segments.len() - 1].bytes().all(|b| b.is_ascii_digit()) {
        matches!(expr.kind(), SegmentKind::Index(_))
    } else {
        matches!(expr.kind(), SegmentKind::Property(_))
    };
    if !expected_kind {
        return TestResult::failed();
    }

    match expr.chain() {
        Ok(chain) => TestResult::from_bool(chain.len() == segments.len()),
        Err(_) => TestResult::failed(),
    }
}

#[test]
fn prop_parse_round_trip() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(parse_round_trip as fn(Vec<u8>) -> TestResult);
}

/// Property: any property path written under Create can be read back.
fn set_then_get(raw: Vec<u8>, value: i64) -> TestResult {
    if raw.is_empty() || raw.len() > 6 {
        return TestResult::discard();
    }

    let path = raw
        .iter()
        .map(|b| format!("p{}", b % 16))
        .collect::<Vec<_>>()
        .join(".");

    let ctx = NavigationContext::new();
    let mut root = json_root(json!({}));
    let nav = Navigator::new(&ctx);

    if nav
        .set(Some(&mut root), &path, NavigationMode::Create, Value::int(value))
        .is_err()
    {
        return TestResult::failed();
    }
    match nav.get(Some(&mut root), &path, NavigationMode::Lenient) {
        Ok(read) => TestResult::from_bool(read == Some(Value::int(value))),
        Err(_) => TestResult::failed(),
    }
}

#[test]
fn prop_set_then_get() {
    QuickCheck::new()
        .tests(200)
        .quickcheck(set_then_get as fn(Vec<u8>, i64) -> TestResult);
}

/// Property: repeated reads of deterministic paths are identical and leave
/// the root untouched, with or without caching.
#[test]
fn prop_get_idempotent() {
    let paths = [
        "",
        "a",
        "a.b",
        "a.b.0",
        "a.b.1",
        "a.b.9",
        "missing",
        "a.missing",
        "a.b.#size",
        "name.#upper",
    ];

    for ctx in [NavigationContext::new(), NavigationContext::uncached()] {
        let mut root = json_root(json!({ "a": { "b": [1, 2] }, "name": "ada" }));
        let before = root.clone();
        let nav = Navigator::new(&ctx);

        for path in paths {
            let first = nav.get(Some(&mut root), path, NavigationMode::Lenient).unwrap();
            let second = nav.get(Some(&mut root), path, NavigationMode::Lenient).unwrap();
            assert_eq!(first, second, "`{}` must resolve consistently", path);
        }
        assert_eq!(root, before);
    }
}
