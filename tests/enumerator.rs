// tests/enumerator.rs

mod common;

use std::sync::Arc;

use common::{cwd, np};
use globwatch::watch::{DirectoryEnumerator, FsDirectoryEnumerator, MatcherRegistry, PatternCompiler};
use globwatch_test_utils::builders::sample_tree;

fn expand(includes: &[&str], ignores: &[&str]) -> Vec<String> {
    let fs = Arc::new(sample_tree());
    let compiler = PatternCompiler::new(cwd(), fs.clone());
    let mut registry = MatcherRegistry::new();
    for pat in ignores {
        registry.add_ignore(&compiler.compile_ignore(pat).unwrap()).unwrap();
    }
    let patterns: Vec<_> = includes.iter().map(|p| compiler.compile(p).unwrap()).collect();

    FsDirectoryEnumerator::new(fs, cwd())
        .directories(&patterns, &registry)
        .unwrap()
        .into_iter()
        .map(|p| p.to_string())
        .collect()
}

#[test]
fn depth_follows_the_suffix() {
    assert_eq!(expand(&["src/*.ts"], &[]), vec!["/work/src"]);
    assert_eq!(expand(&["src/*/*.ts"], &[]), vec!["/work/src", "/work/src/lib"]);
    assert_eq!(
        expand(&["src/**/*.ts"], &[]),
        vec!["/work/src", "/work/src/lib", "/work/src/lib/deep"]
    );
}

#[test]
fn overlapping_patterns_are_merged_without_losing_depth() {
    let dirs = expand(&["src/*.ts", "src/**/*.ts"], &[]);
    assert_eq!(dirs, vec!["/work/src", "/work/src/lib", "/work/src/lib/deep"]);
}

#[test]
fn ignored_directories_and_missing_bases_are_skipped() {
    let dirs = expand(&["**/*", "missing/**"], &["**/node_modules", "src/lib"]);
    assert_eq!(dirs, vec!["/work", "/work/.git", "/work/other", "/work/src"]);
}

#[test]
fn file_entries_never_become_directories() {
    let dirs = expand(&["**/*"], &["**/node_modules", "**/.git"]);
    assert!(!dirs.contains(&np("/work/README.md").to_string()));
    assert!(!dirs.iter().any(|d| d.ends_with(".ts")));
}

#[test]
fn reflects_the_current_state_of_the_tree() {
    let fs = Arc::new(sample_tree());
    fs.add_dir("/work/src/empty");
    fs.remove("/work/src/lib");

    let compiler = PatternCompiler::new(cwd(), fs.clone());
    let patterns = vec![compiler.compile("src").unwrap()];
    let dirs = FsDirectoryEnumerator::new(fs, cwd())
        .directories(&patterns, &MatcherRegistry::new())
        .unwrap();

    assert_eq!(dirs, vec![np("/work/src"), np("/work/src/empty")]);
}
