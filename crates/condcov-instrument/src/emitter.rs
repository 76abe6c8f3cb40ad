//! Emission of the generated runtime files.
//!
//! An instrumented package gains up to four generated files:
//!
//! - `condcov_fixed.go` — the runtime itself, identical for every package
//!   except for the package clause.
//! - `condcov_variable.go` — the per-package condition table and options.
//! - `condcov_no_testmain_test.go` — a bootstrap `TestMain` for packages
//!   that have none of their own.
//! - `condcov_bridge_test.go` — unexported-name shims for test files
//!   compiled into the external `<pkg>_test` package.

use std::fmt::Write as _;

use crate::table::CoverageTable;

/// Template for the fixed runtime; everything after its package clause is
/// emitted verbatim.
const FIXED_RUNTIME: &str = include_str!("templates/condcov_fixed.go");

/// Runtime behavior baked into `condcov_variable.go`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Persist the counts after every single cover call instead of only
    /// at exit, for programs that crash or kill themselves.
    pub immediately: bool,
    /// Report fully covered conditions too, not only the gaps.
    pub list_all: bool,
}

/// The fixed runtime, re-homed into `pkg`.
pub fn fixed_runtime(pkg: &str) -> String {
    let body = FIXED_RUNTIME
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or(FIXED_RUNTIME);
    format!("package {pkg}\n{body}")
}

/// The per-package table: options literal plus one entry per condition.
pub fn variable_file(pkg: &str, table: &CoverageTable, opts: RuntimeOptions) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "package {pkg}\n\n// Code generated by condcov; DO NOT EDIT.\n\nvar condcovOpts = condcovOptions{{\n\timmediately: {},\n\tlistAll:     {},\n}}\n\nvar condcovConds = []condcovCond{{\n",
        opts.immediately, opts.list_all
    );
    for cond in table.conditions() {
        let _ = writeln!(
            out,
            "\t{{Start: {}, Code: {}}},",
            go_quote(&cond.start),
            go_quote(&cond.text)
        );
    }
    out.push_str("}\n");
    out
}

/// A `TestMain` that loads previous counts and flushes on exit.
pub fn bootstrap_test_main(pkg: &str) -> String {
    format!(
        "package {pkg}\n\n// Code generated by condcov; DO NOT EDIT.\n\nimport (\n\t\"os\"\n\t\"testing\"\n)\n\nfunc TestMain(m *testing.M) {{\n\tcondcovLoad()\n\tos.Exit(condcovFinish(m.Run()))\n}}\n"
    )
}

/// Shims that let external test files keep calling the unexported hook
/// names; they delegate to the exported hooks of the package under test.
pub fn bridge_file(pkg: &str, import_path: &str) -> String {
    let path = go_quote(import_path);
    format!(
        "package {pkg}_test\n\n// Code generated by condcov; DO NOT EDIT.\n\nimport {pkg} {path}\n\nfunc condcovCover(idx int, cond bool) bool {{ return {pkg}.CondcovCover(idx, cond) }}\n\nfunc condcovLoad() {{ {pkg}.CondcovLoad() }}\n\nfunc condcovFinish(exitCode int) int {{ return {pkg}.CondcovFinish(exitCode) }}\n"
    )
}

/// Quote `s` as a Go interpreted string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_runtime_is_rehomed() {
        let out = fixed_runtime("mypkg");
        assert!(out.starts_with("package mypkg\n"));
        assert!(out.contains("func condcovCover(idx int, cond bool) bool {"));
        assert!(out.contains("os.Getenv(\"CONDCOV_STATS\")"));
        assert!(out.contains("Branch coverage: %d/%d"));
        assert!(out.contains("func CondcovFinish(exitCode int) int"));
    }

    #[test]
    fn runtime_summary_counts_each_side_out_of_twice_the_conditions() {
        let out = fixed_runtime("mypkg");
        assert!(out.contains("if c.TrueCount > 0 {"));
        assert!(out.contains("if c.FalseCount > 0 {"));
        assert!(out.contains("covered, 2*len(condcovConds)"));
    }

    #[test]
    fn runtime_has_no_default_stats_path() {
        let out = fixed_runtime("mypkg");
        assert!(!out.contains("condcov-stats.json"));
        let stats_fn = out
            .split("func condcovStatsPath() string {")
            .nth(1)
            .and_then(|rest| rest.split("\n}\n").next())
            .expect("condcovStatsPath body");
        assert!(stats_fn.contains("CONDCOV_STATS is not set"));
        assert!(stats_fn.contains("os.Exit(1)"));
    }

    #[test]
    fn variable_file_lists_conditions_in_order() {
        let mut table = CoverageTable::new();
        table.add("demo.go:4:5".into(), "a > 0".into());
        table.add("demo.go:5:9".into(), "s == \"x\"".into());
        let out = variable_file("mypkg", &table, RuntimeOptions::default());
        assert!(out.contains("immediately: false"));
        assert!(out.contains("\t{Start: \"demo.go:4:5\", Code: \"a > 0\"},\n"));
        assert!(out.contains("\t{Start: \"demo.go:5:9\", Code: \"s == \\\"x\\\"\"},\n"));
    }

    #[test]
    fn bootstrap_wires_load_and_finish() {
        let out = bootstrap_test_main("mypkg");
        assert!(out.contains("func TestMain(m *testing.M) {"));
        assert!(out.contains("condcovLoad()"));
        assert!(out.contains("os.Exit(condcovFinish(m.Run()))"));
    }

    #[test]
    fn bridge_delegates_to_exported_hooks() {
        let out = bridge_file("mypkg", "example.com/mod/mypkg");
        assert!(out.starts_with("package mypkg_test\n"));
        assert!(out.contains("import mypkg \"example.com/mod/mypkg\""));
        assert!(out.contains("return mypkg.CondcovCover(idx, cond)"));
    }

    #[test]
    fn quoting_escapes_specials() {
        assert_eq!(go_quote("a > 0"), "\"a > 0\"");
        assert_eq!(go_quote("s == \"x\\y\""), "\"s == \\\"x\\\\y\\\"\"");
        assert_eq!(go_quote("a\nb"), "\"a\\nb\"");
    }
}
