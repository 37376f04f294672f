#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use globwatch::config::WatchOptions;
use globwatch::engine::GlobWatcher;
use globwatch::fs::mock::MockFileSystem;

use crate::fake_native::FakeNativeWatcher;

/// Working directory used by builder-made watchers.
pub const TEST_CWD: &str = "/work";

/// Builder for `WatchOptions` to simplify test setup.
pub struct WatchOptionsBuilder {
    options: WatchOptions,
}

impl WatchOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: WatchOptions {
                cwd: Some(PathBuf::from(TEST_CWD)),
                ..WatchOptions::default()
            },
        }
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.options.cwd = Some(PathBuf::from(cwd));
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.options.ignored.push(pattern.to_string());
        self
    }

    pub fn polling(mut self, interval: Duration) -> Self {
        self.options.use_polling = true;
        self.options.poll_interval = interval;
        self
    }

    pub fn build(self) -> WatchOptions {
        self.options
    }
}

impl Default for WatchOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a controller test usually needs.
pub struct TestWatcher {
    pub watcher: GlobWatcher<FakeNativeWatcher>,
    pub native: FakeNativeWatcher,
    pub fs: MockFileSystem,
}

/// Build a controller over an in-memory filesystem and a fake native
/// watcher, rooted at [`TEST_CWD`].
pub fn test_watcher(fs: MockFileSystem, options: WatchOptions) -> TestWatcher {
    let native = FakeNativeWatcher::new();
    let watcher = GlobWatcher::new(options, native.clone(), Arc::new(fs.clone()))
        .expect("Failed to build watcher from test options");
    TestWatcher {
        watcher,
        native,
        fs,
    }
}

/// A small project tree under [`TEST_CWD`]:
///
/// ```text
/// /work/README.md
/// /work/src/a.ts
/// /work/src/lib/b.ts
/// /work/src/lib/deep/c.ts
/// /work/other/a.ts
/// /work/node_modules/pkg/index.js
/// /work/.git/HEAD
/// ```
pub fn sample_tree() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/work/README.md");
    fs.add_file("/work/src/a.ts");
    fs.add_file("/work/src/lib/b.ts");
    fs.add_file("/work/src/lib/deep/c.ts");
    fs.add_file("/work/other/a.ts");
    fs.add_file("/work/node_modules/pkg/index.js");
    fs.add_file("/work/.git/HEAD");
    fs
}
