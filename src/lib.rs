//! zig-guide-tools library
//!
//! Maintenance tooling for a markdown Zig developer guide. The library has
//! two independent halves coordinated only through the filesystem:
//!
//! - extraction: classify fenced `zig` blocks as runnable examples or
//!   illustrative snippets, materialize the runnable ones as standalone
//!   files, and generate the `build.zig`/`README.md` scaffold for the
//!   output directory ([`run_extract`]).
//! - rewriting: migrate deprecated API call shapes in `.zig` sources to the
//!   current dialect with a fixed, idempotent rule set ([`run_fix`]).
//!
//! [`run_analyze`] reports block statistics without extracting anything.
//!
//! The primary interface is the `zig-guide-tools` binary; the library is
//! public for tests and custom integrations.

pub mod analysis;
pub mod config;
pub mod documents;
pub mod extract;
pub mod extractor;
pub mod manifest;
pub mod reporting;
pub mod rewrite;
pub mod scaffold;

pub use analysis::run_analyze;
pub use config::GuideConfig;
pub use extract::{run_extract, ExtractOptions};
pub use rewrite::run_fix;
