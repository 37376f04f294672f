// src/watch/patterns.rs

//! Pattern compilation: split a user glob into a literal base directory and
//! a glob suffix evaluated relative to it.
//!
//! ```text
//! "src/**/*.ts"  ->  base = <cwd>/src, suffix = "**/*.ts"
//! "lib"          ->  base = <cwd>/lib, suffix = "**"      (directory)
//! "README.md"    ->  base = <cwd>/README.md, suffix = ""  (existing file)
//! ```

use std::sync::Arc;

use globset::Glob;

use crate::errors::WatchError;
use crate::fs::FileSystem;
use crate::types::TargetKind;
use crate::watch::path_utils::NormalizedPath;

/// Characters that start glob syntax in a path segment.
const GLOB_METACHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Suffix used when a pattern names a directory with no glob part.
pub const RECURSIVE_SUFFIX: &str = "**";

/// Result of compiling one glob pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledPattern {
    /// Longest literal prefix, normalised.
    pub base: NormalizedPath,
    /// Remaining glob relative to `base`; empty for single-file targets.
    pub suffix: String,
    /// Whether the pattern names a single file or a directory tree.
    pub target: TargetKind,
}

impl CompiledPattern {
    /// Full glob (escaped base joined with the suffix).
    pub fn glob(&self) -> String {
        self.base.join_glob(&self.suffix)
    }

    /// True when the suffix can match arbitrarily deep paths.
    pub fn is_recursive(&self) -> bool {
        self.suffix.contains(RECURSIVE_SUFFIX)
    }

    /// Deepest directory level below `base` the suffix can reach, or `None`
    /// when unbounded.
    pub fn max_dir_depth(&self) -> Option<usize> {
        if self.is_recursive() {
            None
        } else {
            Some(self.suffix.matches('/').count())
        }
    }
}

/// Compiles patterns against a fixed working directory.
#[derive(Debug, Clone)]
pub struct PatternCompiler {
    cwd: NormalizedPath,
    fs: Arc<dyn FileSystem>,
}

impl PatternCompiler {
    pub fn new(cwd: NormalizedPath, fs: Arc<dyn FileSystem>) -> Self {
        Self { cwd, fs }
    }

    pub fn cwd(&self) -> &NormalizedPath {
        &self.cwd
    }

    /// Compile a single pattern.
    ///
    /// Fails with [`WatchError::Pattern`] for empty input or glob syntax
    /// that cannot be parsed.
    pub fn compile(&self, pattern: &str) -> Result<CompiledPattern, WatchError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(WatchError::pattern(pattern, "pattern must be a non-empty string"));
        }

        let slashed = trimmed.replace('\\', "/");
        let (literal, suffix) = split_literal_prefix(&slashed);

        if !suffix.is_empty() {
            Glob::new(suffix).map_err(|e| WatchError::pattern(pattern, e.kind()))?;
        }

        let base = if literal.is_empty() {
            self.cwd.clone()
        } else {
            NormalizedPath::resolve(literal, &self.cwd)
        };

        if !suffix.is_empty() {
            return Ok(CompiledPattern {
                base,
                suffix: suffix.to_string(),
                target: TargetKind::Directory,
            });
        }

        if self.fs.is_file(base.as_path()) {
            Ok(CompiledPattern {
                base,
                suffix: String::new(),
                target: TargetKind::File,
            })
        } else {
            Ok(CompiledPattern {
                base,
                suffix: RECURSIVE_SUFFIX.to_string(),
                target: TargetKind::Directory,
            })
        }
    }

    /// Compile an ignore pattern.
    ///
    /// Ignore patterns that start with `**` (e.g. `**/node_modules`) are
    /// anchored at the filesystem root so they apply to every watched tree,
    /// not only the one under the working directory. Any other ignore
    /// (`*.log`, `build`) resolves against the working directory exactly
    /// like an include. Ignore patterns are never treated as single files.
    pub fn compile_ignore(&self, pattern: &str) -> Result<CompiledPattern, WatchError> {
        let mut compiled = self.compile(pattern)?;
        let slashed = pattern.trim().replace('\\', "/");
        if slashed.starts_with(RECURSIVE_SUFFIX) {
            compiled.base = self.cwd.root();
        }
        if compiled.target == TargetKind::File {
            compiled.target = TargetKind::Directory;
        }
        Ok(compiled)
    }
}

/// Split at the first path segment containing glob syntax.
///
/// Returns `(literal_prefix, glob_suffix)`; the suffix is empty when the
/// pattern has no glob characters at all.
fn split_literal_prefix(pattern: &str) -> (&str, &str) {
    let mut seg_start = 0;
    for (idx, ch) in pattern.char_indices() {
        if ch == '/' {
            seg_start = idx + 1;
        } else if GLOB_METACHARS.contains(&ch) {
            let literal = pattern[..seg_start].trim_end_matches('/');
            // Keep the root for absolute patterns like "/*.log".
            let literal = if literal.is_empty() && pattern.starts_with('/') {
                "/"
            } else {
                literal
            };
            return (literal, &pattern[seg_start..]);
        }
    }
    (pattern, "")
}

#[cfg(test)]
mod tests {
    use super::split_literal_prefix;

    #[test]
    fn splits_at_first_glob_segment() {
        assert_eq!(split_literal_prefix("src/**/*.ts"), ("src", "**/*.ts"));
        assert_eq!(split_literal_prefix("a/b/c*.rs"), ("a/b", "c*.rs"));
        assert_eq!(split_literal_prefix("**/x"), ("", "**/x"));
        assert_eq!(split_literal_prefix("/*.log"), ("/", "*.log"));
        assert_eq!(split_literal_prefix("docs/readme.md"), ("docs/readme.md", ""));
        assert_eq!(split_literal_prefix("C:/w/{a,b}/*.c"), ("C:/w", "{a,b}/*.c"));
    }
}
