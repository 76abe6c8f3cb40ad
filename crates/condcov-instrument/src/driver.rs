//! The package driver: read a source directory, write its instrumented
//! twin.
//!
//! Files are processed in name order, so condition indices are stable
//! across runs. The first error aborts the whole run; the destination is
//! never silently half-written behind a success return.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use condcov_syntax::nodes::traits::to_source;
use condcov_syntax::{parse_file, prettify_error};

use crate::constraints::BuildEnv;
use crate::emitter::{self, RuntimeOptions};
use crate::error::{InstrumentError, Result};
use crate::mark::{mark_file, Marks};
use crate::plan::{plan_file, Plans};
use crate::prepare::prepare_file;
use crate::replace::replace_file;
use crate::table::CoverageTable;
use crate::testmain::{has_test_main, rewrite_test_main};

/// Instrumentation settings for one run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Instrument only whole controlling conditions, without decomposing
    /// short-circuit operators or catching bare comparisons.
    pub branch_coverage: bool,
    /// Instrument `_test.go` files too.
    pub cover_test: bool,
    /// Persist counts after every cover call.
    pub immediately: bool,
    /// Report fully covered conditions as well.
    pub list_all: bool,
    /// Target platform for build-constraint evaluation.
    pub goos: String,
    pub goarch: String,
}

impl Default for Options {
    fn default() -> Self {
        let host = BuildEnv::host();
        Self {
            branch_coverage: false,
            cover_test: false,
            immediately: false,
            list_all: false,
            goos: host.goos,
            goarch: host.goarch,
        }
    }
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct Summary {
    /// Files that went through the instrumentation pipeline.
    pub instrumented: Vec<String>,
    /// Conditions registered across the whole package.
    pub conditions: usize,
    /// Files excluded by a build constraint and copied verbatim.
    pub skipped: Vec<String>,
}

/// Instrument the single-level package directory `src` into `dst`.
///
/// Non-source files at the top level are copied along so the destination
/// stays buildable; subdirectories are not descended into.
pub fn instrument_package(src: &Path, dst: &Path, options: &Options) -> Result<Summary> {
    let env = BuildEnv::new(&options.goos, &options.goarch);
    fs::create_dir_all(dst).map_err(|e| InstrumentError::io(dst, e))?;

    let mut summary = Summary::default();
    let mut table = CoverageTable::new();
    let mut pkg: Option<String> = None;
    let mut external_test = false;
    let mut test_main_found = false;

    for entry in WalkDir::new(src)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            InstrumentError::io(src, io)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if !name.ends_with(".go") {
            fs::copy(path, dst.join(&name)).map_err(|e| InstrumentError::io(path, e))?;
            continue;
        }

        let source = fs::read_to_string(path).map_err(|e| InstrumentError::io(path, e))?;
        if !env.file_matches(&name, &source) {
            debug!(file = %name, "excluded by build constraint");
            fs::write(dst.join(&name), &source).map_err(|e| InstrumentError::io(path, e))?;
            summary.skipped.push(name);
            continue;
        }

        let mut file = parse_file(&source).map_err(|e| InstrumentError::Parse {
            file: path.to_path_buf(),
            message: prettify_error(&e, &source, &name),
        })?;

        let is_test = name.ends_with("_test.go");
        let pkg_name = file.package_name().to_string();
        if is_test && pkg_name.ends_with("_test") {
            external_test = true;
        } else if pkg.is_none() {
            pkg = Some(pkg_name);
        }

        if !is_test || options.cover_test {
            let before = table.len();
            let mut marks = Marks::new();
            mark_file(&file, options.branch_coverage, &mut marks);
            prepare_file(&mut file, &mut marks);
            let mut plans = Plans::new();
            plan_file(&file, &name, &mut marks, &mut plans);
            replace_file(&mut file, &mut plans, &mut table);
            info!(file = %name, conditions = table.len() - before, "instrumented");
            summary.instrumented.push(name.clone());
        }
        if is_test && has_test_main(&file) {
            rewrite_test_main(&mut file, path)?;
            test_main_found = true;
        }

        fs::write(dst.join(&name), to_source(&file)).map_err(|e| InstrumentError::io(path, e))?;
    }

    summary.conditions = table.len();
    let Some(pkg) = pkg else {
        // No package source files at all; nothing to attach a runtime to.
        return Ok(summary);
    };

    let runtime_opts = RuntimeOptions {
        immediately: options.immediately,
        list_all: options.list_all,
    };
    write_generated(dst, "condcov_fixed.go", emitter::fixed_runtime(&pkg))?;
    write_generated(
        dst,
        "condcov_variable.go",
        emitter::variable_file(&pkg, &table, runtime_opts),
    )?;
    if !test_main_found {
        write_generated(
            dst,
            "condcov_no_testmain_test.go",
            emitter::bootstrap_test_main(&pkg),
        )?;
    }
    if external_test {
        let import_path = resolve_import_path(src)?;
        write_generated(
            dst,
            "condcov_bridge_test.go",
            emitter::bridge_file(&pkg, &import_path),
        )?;
    }

    info!(
        files = summary.instrumented.len(),
        conditions = summary.conditions,
        skipped = summary.skipped.len(),
        "package instrumented"
    );
    Ok(summary)
}

fn write_generated(dst: &Path, name: &str, content: String) -> Result<()> {
    let path = dst.join(name);
    fs::write(&path, content).map_err(|e| InstrumentError::io(&path, e))
}

/// Resolve the package's import path by walking up to the nearest module
/// descriptor.
fn resolve_import_path(pkg_dir: &Path) -> Result<String> {
    let not_found = || InstrumentError::ModuleNotFound {
        dir: pkg_dir.to_path_buf(),
    };
    let mut dir = pkg_dir.to_path_buf();
    loop {
        let descriptor = dir.join("go.mod");
        if descriptor.is_file() {
            let text =
                fs::read_to_string(&descriptor).map_err(|e| InstrumentError::io(&descriptor, e))?;
            let module = text
                .lines()
                .find_map(|l| l.trim().strip_prefix("module "))
                .map(|m| m.trim().trim_matches('"').to_string())
                .ok_or_else(not_found)?;
            let rel = pkg_dir.strip_prefix(&dir).unwrap_or(Path::new(""));
            if rel.as_os_str().is_empty() {
                return Ok(module);
            }
            let rel = rel.display().to_string().replace('\\', "/");
            return Ok(format!("{module}/{rel}"));
        }
        if !dir.pop() {
            return Err(not_found());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn linux_options() -> Options {
        Options {
            goos: "linux".to_string(),
            goarch: "amd64".to_string(),
            ..Options::default()
        }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("write fixture");
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).expect("read output")
    }

    #[test]
    fn instruments_package_and_emits_runtime() {
        let src = TempDir::new().expect("tempdir");
        let dst = TempDir::new().expect("tempdir");
        write(
            src.path(),
            "demo.go",
            "package demo\n\nfunc Positive(i int) bool {\n\treturn i > 0\n}\n",
        );

        let summary =
            instrument_package(src.path(), dst.path(), &linux_options()).expect("instrument");
        assert_eq!(summary.instrumented, vec!["demo.go"]);
        assert_eq!(summary.conditions, 1);

        let out = read(dst.path(), "demo.go");
        assert!(out.contains("return condcovCover(0, i > 0)"));
        assert!(read(dst.path(), "condcov_fixed.go").starts_with("package demo\n"));
        let var = read(dst.path(), "condcov_variable.go");
        assert!(var.contains("{Start: \"demo.go:4:9\", Code: \"i > 0\"},"));
        assert!(read(dst.path(), "condcov_no_testmain_test.go").contains("func TestMain"));
    }

    #[test]
    fn constraint_excluded_files_are_copied_verbatim() {
        let src = TempDir::new().expect("tempdir");
        let dst = TempDir::new().expect("tempdir");
        write(src.path(), "a.go", "package demo\n\nvar ok = 1 > 0\n");
        let windows_src = "//go:build windows\n\npackage demo\n\nvar win = 1 > 0\n";
        write(src.path(), "b_windows.go", windows_src);

        let summary =
            instrument_package(src.path(), dst.path(), &linux_options()).expect("instrument");
        assert_eq!(summary.skipped, vec!["b_windows.go"]);
        assert_eq!(read(dst.path(), "b_windows.go"), windows_src);
        assert!(read(dst.path(), "a.go").contains("condcovCover(0, 1 > 0)"));
    }

    #[test]
    fn test_files_are_left_alone_without_cover_test() {
        let src = TempDir::new().expect("tempdir");
        let dst = TempDir::new().expect("tempdir");
        write(src.path(), "demo.go", "package demo\n\nvar ok = 1 > 0\n");
        let test_src =
            "package demo\n\nfunc TestOk(t *testing.T) {\n\tif !ok {\n\t\tt.Fail()\n\t}\n}\n";
        write(src.path(), "demo_test.go", test_src);

        let summary =
            instrument_package(src.path(), dst.path(), &linux_options()).expect("instrument");
        assert_eq!(summary.instrumented, vec!["demo.go"]);
        assert_eq!(read(dst.path(), "demo_test.go"), test_src);

        let mut options = linux_options();
        options.cover_test = true;
        let dst2 = TempDir::new().expect("tempdir");
        let summary =
            instrument_package(src.path(), dst2.path(), &options).expect("instrument");
        assert_eq!(summary.instrumented, vec!["demo.go", "demo_test.go"]);
        assert!(read(dst2.path(), "demo_test.go").contains("condcovCover"));
    }

    #[test]
    fn user_test_main_suppresses_bootstrap() {
        let src = TempDir::new().expect("tempdir");
        let dst = TempDir::new().expect("tempdir");
        write(src.path(), "demo.go", "package demo\n\nvar ok = 1 > 0\n");
        write(
            src.path(),
            "main_test.go",
            "package demo\n\nfunc TestMain(m *testing.M) {\n\tos.Exit(m.Run())\n}\n",
        );

        instrument_package(src.path(), dst.path(), &linux_options()).expect("instrument");
        assert!(read(dst.path(), "main_test.go").contains("os.Exit(condcovFinish(m.Run()))"));
        assert!(!dst.path().join("condcov_no_testmain_test.go").exists());
    }

    #[test]
    fn external_tests_get_a_bridge() {
        let src = TempDir::new().expect("tempdir");
        let dst = TempDir::new().expect("tempdir");
        write(src.path(), "go.mod", "module example.com/demo\n\ngo 1.22\n");
        write(src.path(), "demo.go", "package demo\n\nvar ok = 1 > 0\n");
        write(
            src.path(),
            "demo_ext_test.go",
            "package demo_test\n\nfunc TestOk(t *testing.T) {\n}\n",
        );

        instrument_package(src.path(), dst.path(), &linux_options()).expect("instrument");
        let bridge = read(dst.path(), "condcov_bridge_test.go");
        assert!(bridge.starts_with("package demo_test\n"));
        assert!(bridge.contains("import demo \"example.com/demo\""));
    }

    #[test]
    fn missing_module_descriptor_is_an_error() {
        let src = TempDir::new().expect("tempdir");
        let dst = TempDir::new().expect("tempdir");
        write(src.path(), "demo.go", "package demo\n\nvar ok = 1 > 0\n");
        write(
            src.path(),
            "demo_ext_test.go",
            "package demo_test\n\nfunc TestOk(t *testing.T) {\n}\n",
        );

        let err = instrument_package(src.path(), dst.path(), &linux_options()).unwrap_err();
        assert!(matches!(err, InstrumentError::ModuleNotFound { .. }));
    }
}
