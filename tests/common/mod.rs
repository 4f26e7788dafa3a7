//! Common test utilities for integration tests
//!
//! Builds temporary guide trees for tests to run against. Every fixture is
//! an isolated `TempDir`, so tests run in parallel without interfering with
//! each other; cleanup is RAII via Drop.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated guide tree with automatic cleanup.
pub struct GuideFixture {
    root: TempDir,
}

impl GuideFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            root: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Create `sections/{name}/content.md` with the given markdown.
    pub fn add_chapter(&self, name: &str, markdown: &str) -> Result<PathBuf> {
        let chapter_dir = self.root.path().join("sections").join(name);
        fs::create_dir_all(&chapter_dir)?;
        fs::write(chapter_dir.join("content.md"), markdown)?;
        Ok(chapter_dir)
    }

    /// Create an arbitrary file relative to the fixture root.
    pub fn add_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// A fresh output directory path inside the fixture (not yet created).
    pub fn output_dir(&self, name: &str) -> PathBuf {
        self.root.path().join("examples").join(name)
    }
}

/// A markdown chapter with a heading-titled runnable block.
pub fn runnable_chapter(heading: &str, body: &str) -> String {
    format!("### {}\n\n```zig\n{}```\n", heading, body)
}

/// The canonical runnable block body used across tests.
pub const HELLO_BODY: &str =
    "const std = @import(\"std\");\n\npub fn main() void {\n    std.debug.print(\"hi\\n\", .{});\n}\n";
