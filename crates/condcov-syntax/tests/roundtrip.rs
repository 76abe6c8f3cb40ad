//! Round-trip tests for the condcov-syntax parser.
//!
//! These tests verify that `to_source(parse_file(code)) == code` for valid
//! input. This is a fundamental invariant for the instrumenter: files it
//! does not modify must print back byte-identically.
//!
//! # Test Organization
//!
//! - Fixture-based tests: One test per fixture file in `tests/fixtures/`
//! - Inline tests: Individual test cases for specific constructs
//!
//! # Adding New Tests
//!
//! To add a new fixture-based test, create a `.go` file in `tests/fixtures/`
//! and add a corresponding `roundtrip_fixture_<name>` test function.

use std::path::PathBuf;

use difference::assert_diff;
use itertools::Itertools;

use condcov_syntax::{parse_file, prettify_error, to_source};

/// Helper to visualize whitespace differences in test output
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

/// Helper to perform round-trip test on source code
fn assert_roundtrip(input: &str, label: &str) {
    let file = match parse_file(input) {
        Ok(f) => f,
        Err(e) => panic!("{}", prettify_error(&e, input, label)),
    };
    let generated = to_source(&file);

    if generated != input {
        let got = visualize(&generated);
        let expected = visualize(input);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

/// Helper to load and test a fixture file
fn assert_roundtrip_fixture(fixture_name: &str) {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(fixture_name);

    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", fixture_name, e));

    assert_roundtrip(&contents, fixture_name);
}

// =============================================================================
// Fixture-based round-trip tests
// =============================================================================

#[test]
fn roundtrip_fixture_control_flow() {
    assert_roundtrip_fixture("control_flow.go");
}

#[test]
fn roundtrip_fixture_switches() {
    assert_roundtrip_fixture("switches.go");
}

#[test]
fn roundtrip_fixture_declarations() {
    assert_roundtrip_fixture("declarations.go");
}

#[test]
fn roundtrip_fixture_comments() {
    assert_roundtrip_fixture("comments.go");
}

// =============================================================================
// Inline round-trip tests for specific constructs
// =============================================================================

#[test]
fn roundtrip_line_directives_stay_in_place() {
    assert_roundtrip(
        "package p\n\n//line grammar.y:10\nvar generated = 1 > 0\n",
        "line_directive",
    );
}

#[test]
fn roundtrip_nested_control_flow() {
    assert_roundtrip(
        "package p\n\nfunc f(xs []int) int {\n\tn := 0\n\tfor i := 0; i < len(xs); i++ {\n\t\tswitch {\n\t\tcase xs[i] > 0:\n\t\t\tif xs[i] > 10 {\n\t\t\t\tn += 2\n\t\t\t} else {\n\t\t\t\tn++\n\t\t\t}\n\t\t}\n\t}\n\treturn n\n}\n",
        "nested_control_flow",
    );
}

#[test]
fn roundtrip_labels_and_branches() {
    assert_roundtrip(
        "package p\n\nfunc f() {\nouter:\n\tfor {\n\t\tfor {\n\t\t\tbreak outer\n\t\t}\n\t}\n\tgoto outer\n}\n",
        "labels",
    );
}

#[test]
fn roundtrip_composite_literals() {
    assert_roundtrip(
        "package p\n\nvar m = map[string][]int{\"a\": {1, 2}}\n\nvar t = T{x: 1, y: call(2)}\n",
        "composite_literals",
    );
}

#[test]
fn roundtrip_one_line_bodies() {
    assert_roundtrip(
        "package p\n\nvar f = func(a int) bool { return a > 0 }\n",
        "one_line_bodies",
    );
}
