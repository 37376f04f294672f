// src/watch/path_utils.rs

//! Path normalisation shared by the compiler, the registry and the router.
//!
//! Every path the core stores or compares is a [`NormalizedPath`]: absolute,
//! forward-slash separated, lexically collapsed (`.` and `..` resolved), and
//! carrying an upper-case drive letter whenever the working directory has
//! one. Two spellings of the same location therefore compare equal.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    /// Normalise `input` against `cwd`.
    ///
    /// Relative inputs are joined onto `cwd`. Rooted inputs without a drive
    /// letter inherit the drive of `cwd`, if it has one.
    pub fn resolve(input: &str, cwd: &NormalizedPath) -> Self {
        let slashed = input.replace('\\', "/");
        let (drive, rest) = split_drive(&slashed);
        let (cwd_drive, cwd_body) = split_drive(&cwd.0);

        if rest.starts_with('/') {
            let drive = drive.or(cwd_drive);
            Self::assemble(drive.as_deref(), rest)
        } else {
            let joined = format!("{cwd_body}/{rest}");
            Self::assemble(cwd_drive.as_deref(), &joined)
        }
    }

    /// Normalise an already absolute path. Returns `None` for relative paths.
    pub fn from_absolute(path: &Path) -> Option<Self> {
        let slashed = path.to_string_lossy().replace('\\', "/");
        let (drive, rest) = split_drive(&slashed);
        if !rest.starts_with('/') {
            return None;
        }
        Some(Self::assemble(drive.as_deref(), rest))
    }

    /// Normalised form of the process working directory.
    pub fn current_dir() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::from_absolute(&cwd).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("working directory {cwd:?} is not absolute"),
            )
        })
    }

    fn assemble(drive: Option<&str>, body: &str) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for seg in body.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        let mut out = String::with_capacity(body.len() + 2);
        if let Some(d) = drive {
            out.push_str(d);
        }
        out.push('/');
        out.push_str(&segments.join("/"));
        NormalizedPath(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// True for `/` or `X:/`.
    pub fn is_root(&self) -> bool {
        self.0.ends_with('/')
    }

    /// The filesystem root on the same drive.
    pub fn root(&self) -> NormalizedPath {
        let (drive, _) = split_drive(&self.0);
        Self::assemble(drive.as_deref(), "/")
    }

    /// True if `other` is this path or nested anywhere below it.
    pub fn contains(&self, other: &NormalizedPath) -> bool {
        if self.is_root() {
            return other.0.starts_with(&self.0);
        }
        match other.0.strip_prefix(&self.0) {
            Some("") => true,
            Some(rest) => rest.starts_with('/'),
            None => false,
        }
    }

    /// Build a glob rooted at this path. The path itself is escaped so that
    /// literal bracket or brace characters in directory names stay literal.
    pub fn join_glob(&self, suffix: &str) -> String {
        let escaped = globset::escape(&self.0);
        if suffix.is_empty() {
            escaped
        } else if self.is_root() {
            format!("{escaped}{suffix}")
        } else {
            format!("{escaped}/{suffix}")
        }
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Split a leading `X:` drive designator off a forward-slashed path.
fn split_drive(s: &str) -> (Option<String>, &str) {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = format!("{}:", (bytes[0] as char).to_ascii_uppercase());
        (Some(drive), &s[2..])
    } else {
        (None, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> NormalizedPath {
        NormalizedPath::resolve("/work", &NormalizedPath("/".to_string()))
    }

    #[test]
    fn collapses_dots_and_separators() {
        let p = NormalizedPath::resolve("a//b/./c/../d\\e", &cwd());
        assert_eq!(p.as_str(), "/work/a/b/d/e");
        assert_eq!(NormalizedPath::resolve("../..", &cwd()).as_str(), "/");
    }

    #[test]
    fn containment_is_per_component() {
        let base = NormalizedPath::resolve("/a/b", &cwd());
        assert!(base.contains(&NormalizedPath::resolve("/a/b", &cwd())));
        assert!(base.contains(&NormalizedPath::resolve("/a/b/c", &cwd())));
        assert!(!base.contains(&NormalizedPath::resolve("/a/bc", &cwd())));
        assert!(cwd().root().contains(&base));
    }

    #[test]
    fn glob_joining_escapes_the_base() {
        let base = NormalizedPath::resolve("/w/[x]", &cwd());
        assert_eq!(base.join_glob("*.rs"), "/w/[[]x[]]/*.rs");
        assert_eq!(cwd().root().join_glob("**/x"), "/**/x");
        assert_eq!(cwd().join_glob(""), "/work");
    }

    #[test]
    fn relative_paths_are_not_absolute() {
        assert!(NormalizedPath::from_absolute(Path::new("rel/dir")).is_none());
    }
}
