//! Build constraint evaluation.
//!
//! Files excluded by a build constraint must not be instrumented: their
//! conditions would register in the table but never execute, permanently
//! dragging the coverage numbers down. The driver copies such files
//! verbatim instead.
//!
//! Three sources of constraints are honored, matching the toolchain:
//! `//go:build` expressions, legacy `// +build` lines (consulted only when
//! no `//go:build` line exists), and `_GOOS`/`_GOARCH` file name suffixes.
//! Constraints are only read from the raw comment lines above the package
//! clause. Unknown tags evaluate to false; a malformed expression keeps
//! the file included.

/// The target platform constraints are evaluated against.
#[derive(Debug, Clone)]
pub struct BuildEnv {
    pub goos: String,
    pub goarch: String,
}

const KNOWN_GOOS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "illumos", "ios", "js", "linux",
    "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows",
];

const KNOWN_GOARCH: &[&str] = &[
    "386", "amd64", "arm", "arm64", "loong64", "mips", "mips64", "mips64le", "mipsle",
    "ppc64", "ppc64le", "riscv64", "s390x", "wasm",
];

const UNIX_GOOS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "illumos", "ios", "linux", "netbsd",
    "openbsd", "solaris",
];

impl BuildEnv {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// The host platform, from the build target of this binary.
    pub fn host() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn matches_tag(&self, tag: &str) -> bool {
        tag == self.goos
            || tag == self.goarch
            || (tag == "unix" && UNIX_GOOS.contains(&self.goos.as_str()))
    }

    /// Whether a file with this name and source participates in the build.
    pub fn file_matches(&self, file_name: &str, source: &str) -> bool {
        if !self.name_matches(file_name) {
            return false;
        }
        let (go_build, plus_build) = scan_constraint_lines(source);
        if let Some(expr) = go_build {
            return eval_go_build(self, expr).unwrap_or(true);
        }
        plus_build.iter().all(|line| eval_plus_build_line(self, line))
    }

    /// `name_GOOS.go`, `name_GOARCH.go` and `name_GOOS_GOARCH.go` imply a
    /// constraint; `_test` is stripped first so `x_linux_test.go` counts.
    fn name_matches(&self, file_name: &str) -> bool {
        let Some(stem) = file_name.strip_suffix(".go") else {
            return true;
        };
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        let parts: Vec<&str> = stem.split('_').collect();
        // A leading part must remain: `_linux.go` is not constrained.
        match parts.as_slice() {
            [.., prev, os, arch]
                if !prev.is_empty() && KNOWN_GOOS.contains(os) && KNOWN_GOARCH.contains(arch) =>
            {
                *os == self.goos && *arch == self.goarch
            }
            [.., prev, os] if !prev.is_empty() && KNOWN_GOOS.contains(os) => *os == self.goos,
            [.., prev, arch] if !prev.is_empty() && KNOWN_GOARCH.contains(arch) => {
                *arch == self.goarch
            }
            _ => true,
        }
    }
}

/// Collect the first `//go:build` expression and all `// +build` lines
/// from the comment block above the package clause.
fn scan_constraint_lines(source: &str) -> (Option<&str>, Vec<&str>) {
    let mut go_build = None;
    let mut plus_build = Vec::new();
    let mut in_block_comment = false;
    for line in source.lines() {
        let trimmed = line.trim();
        if in_block_comment {
            if trimmed.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if trimmed.starts_with("/*") && !trimmed.contains("*/") {
            in_block_comment = true;
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("//go:build ") {
            if go_build.is_none() {
                go_build = Some(rest.trim());
            }
        } else if let Some(rest) = trimmed.strip_prefix("// +build ") {
            plus_build.push(rest.trim());
        } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
            // The package clause or anything else ends the preamble.
            break;
        }
    }
    (go_build, plus_build)
}

// === //go:build expressions ================================================

/// `expr = orterm { "||" orterm } ; orterm = andterm { "&&" andterm } ;
/// andterm = "!" andterm | "(" expr ")" | tag`
fn eval_go_build(env: &BuildEnv, expr: &str) -> Option<bool> {
    let toks = lex_build_expr(expr)?;
    let mut parser = BuildExprParser { toks: &toks, idx: 0 };
    let value = parser.or_expr(env)?;
    if parser.idx != parser.toks.len() {
        return None;
    }
    Some(value)
}

#[derive(Debug, PartialEq)]
enum BuildTok<'a> {
    Tag(&'a str),
    AndAnd,
    OrOr,
    Not,
    LParen,
    RParen,
}

fn lex_build_expr(expr: &str) -> Option<Vec<BuildTok<'_>>> {
    let mut toks = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'(' => {
                toks.push(BuildTok::LParen);
                i += 1;
            }
            b')' => {
                toks.push(BuildTok::RParen);
                i += 1;
            }
            b'!' => {
                toks.push(BuildTok::Not);
                i += 1;
            }
            b'&' if bytes.get(i + 1) == Some(&b'&') => {
                toks.push(BuildTok::AndAnd);
                i += 2;
            }
            b'|' if bytes.get(i + 1) == Some(&b'|') => {
                toks.push(BuildTok::OrOr);
                i += 2;
            }
            c if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                toks.push(BuildTok::Tag(&expr[start..i]));
            }
            _ => return None,
        }
    }
    Some(toks)
}

struct BuildExprParser<'a> {
    toks: &'a [BuildTok<'a>],
    idx: usize,
}

impl<'a> BuildExprParser<'a> {
    fn next_is(&mut self, tok: &BuildTok<'_>) -> bool {
        if self.toks.get(self.idx) == Some(tok) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self, env: &BuildEnv) -> Option<bool> {
        let mut value = self.and_expr(env)?;
        while self.next_is(&BuildTok::OrOr) {
            value |= self.and_expr(env)?;
        }
        Some(value)
    }

    fn and_expr(&mut self, env: &BuildEnv) -> Option<bool> {
        let mut value = self.unary(env)?;
        while self.next_is(&BuildTok::AndAnd) {
            value &= self.unary(env)?;
        }
        Some(value)
    }

    fn unary(&mut self, env: &BuildEnv) -> Option<bool> {
        if self.next_is(&BuildTok::Not) {
            return Some(!self.unary(env)?);
        }
        if self.next_is(&BuildTok::LParen) {
            let value = self.or_expr(env)?;
            if !self.next_is(&BuildTok::RParen) {
                return None;
            }
            return Some(value);
        }
        match self.toks.get(self.idx) {
            Some(BuildTok::Tag(tag)) => {
                self.idx += 1;
                Some(env.matches_tag(tag))
            }
            _ => None,
        }
    }
}

// === Legacy // +build lines ================================================

/// Within one line, space-separated options are OR'd and comma-joined
/// terms within an option are AND'd. Lines themselves are AND'd by the
/// caller.
fn eval_plus_build_line(env: &BuildEnv, line: &str) -> bool {
    line.split_whitespace().any(|option| {
        option.split(',').all(|term| match term.strip_prefix('!') {
            Some(tag) => !env.matches_tag(tag),
            None => env.matches_tag(term),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_amd64() -> BuildEnv {
        BuildEnv::new("linux", "amd64")
    }

    #[test]
    fn go_build_expressions() {
        let env = linux_amd64();
        assert!(env.file_matches("a.go", "//go:build linux\npackage p\n"));
        assert!(!env.file_matches("a.go", "//go:build windows\npackage p\n"));
        assert!(env.file_matches("a.go", "//go:build linux && amd64\npackage p\n"));
        assert!(env.file_matches("a.go", "//go:build windows || unix\npackage p\n"));
        assert!(!env.file_matches("a.go", "//go:build !linux\npackage p\n"));
        assert!(env.file_matches(
            "a.go",
            "//go:build !(windows && cgo)\npackage p\n"
        ));
    }

    #[test]
    fn unknown_tags_are_false() {
        let env = linux_amd64();
        assert!(!env.file_matches("a.go", "//go:build ignore\npackage p\n"));
        assert!(env.file_matches("a.go", "//go:build !ignore\npackage p\n"));
    }

    #[test]
    fn go_build_wins_over_plus_build() {
        let env = linux_amd64();
        let src = "//go:build linux\n// +build windows\npackage p\n";
        assert!(env.file_matches("a.go", src));
    }

    #[test]
    fn plus_build_lines_are_anded() {
        let env = linux_amd64();
        assert!(env.file_matches("a.go", "// +build linux darwin\npackage p\n"));
        assert!(!env.file_matches(
            "a.go",
            "// +build linux\n// +build 386\npackage p\n"
        ));
        assert!(!env.file_matches("a.go", "// +build linux,386\npackage p\n"));
    }

    #[test]
    fn constraints_after_package_clause_are_ignored() {
        let env = linux_amd64();
        let src = "package p\n\n//go:build windows\n";
        assert!(env.file_matches("a.go", src));
    }

    #[test]
    fn file_name_suffixes() {
        let env = linux_amd64();
        assert!(env.file_matches("x_linux.go", "package p\n"));
        assert!(!env.file_matches("x_windows.go", "package p\n"));
        assert!(env.file_matches("x_linux_amd64.go", "package p\n"));
        assert!(!env.file_matches("x_linux_arm64.go", "package p\n"));
        assert!(!env.file_matches("x_windows_test.go", "package p\n"));
        // Not a constraint without a leading name part.
        assert!(env.file_matches("_linux.go", "package p\n"));
        assert!(env.file_matches("notaplatform_foo.go", "package p\n"));
    }

    #[test]
    fn malformed_expression_keeps_the_file() {
        let env = linux_amd64();
        assert!(env.file_matches("a.go", "//go:build &&\npackage p\n"));
    }
}
