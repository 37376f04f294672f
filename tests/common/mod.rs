#![allow(dead_code)]

use globwatch::watch::NormalizedPath;

pub fn np(path: &str) -> NormalizedPath {
    NormalizedPath::from_absolute(std::path::Path::new(path)).expect("test paths are absolute")
}

pub fn cwd() -> NormalizedPath {
    np("/work")
}
