//! Textual migration of deprecated Zig API call shapes to the 0.15 dialect.
//!
//! The 0.15 release moved the standard containers to unmanaged form: they no
//! longer store an allocator, so initialization becomes a literal and the
//! mutating calls take the allocator explicitly. The rules here rewrite the
//! old call shapes; each rule's pattern excludes its own output, so applying
//! the full set twice is a no-op on the second pass.
//!
//! What the rules deliberately do not touch: a `deinit()` on something that
//! looks like an allocator object (a GPA or arena owns no allocator argument
//! to pass), and calls whose allocator argument is spelled with a
//! non-standard name. Both would need type information to resolve and are
//! left to the author, the first with a warning.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ARRAYLIST_INIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"std\.ArrayList\(([^)]+)\)\.init\(\s*\w+\s*\)").unwrap());

static HASHMAP_INIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(std\.\w*HashMap\w*\([^)]+\))\.init\(\s*\)").unwrap());

static APPEND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\.append\(([^)]*)\)").unwrap());

static APPEND_SLICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\.appendSlice\(([^)]*)\)").unwrap());

static PUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\.put\(([^)]*)\)").unwrap());

static DEINIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\.deinit\(\s*\)").unwrap());

static TO_OWNED_SLICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.toOwnedSlice\(\s*\)").unwrap());

/// Receiver names that denote an allocator object rather than a container.
/// Their `deinit()` takes no allocator and must never be rewritten.
const ALLOCATOR_RECEIVERS: &[&str] = &["gpa", "arena", "allocator", "alloc", "fba"];

fn looks_like_allocator(receiver: &str) -> bool {
    let lower = receiver.to_ascii_lowercase();
    ALLOCATOR_RECEIVERS.contains(&lower.as_str())
        || lower.ends_with("_allocator")
        || lower.ends_with("_arena")
        || lower.ends_with("_gpa")
}

/// True when an argument list already leads with the allocator.
fn has_leading_allocator(args: &str) -> bool {
    let args = args.trim_start();
    args == "allocator" || args.starts_with("allocator,")
}

/// One fixed textual transformation in the migration set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteRule {
    name: &'static str,
    summary: &'static str,
    kind: RuleKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    /// `std.ArrayList(T).init(alloc)` -> `std.ArrayList(T){}`
    ArrayListInit,
    /// `std.XHashMapY(args).init()` -> `std.XHashMapY(args){}`
    HashMapInit,
    /// `recv.method(args)` -> `recv.method(allocator, args)`
    LeadingAllocatorArg { method: &'static str },
    /// `recv.deinit()` -> `recv.deinit(allocator)`, allocator objects excluded
    ContainerDeinit,
    /// `.toOwnedSlice()` -> `.toOwnedSlice(allocator)`
    ToOwnedSlice,
}

impl RewriteRule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Whether the rule is worth running against this file at all. The
    /// argument-inserting rules only make sense where the matching container
    /// type actually appears.
    fn applies_to(&self, content: &str) -> bool {
        match self.kind {
            RuleKind::ArrayListInit | RuleKind::HashMapInit | RuleKind::ToOwnedSlice => true,
            RuleKind::LeadingAllocatorArg { method: "put" } => content.contains("Hash"),
            RuleKind::LeadingAllocatorArg { .. } => content.contains("ArrayList"),
            RuleKind::ContainerDeinit => {
                content.contains("ArrayList") || content.contains("Hash")
            }
        }
    }

    /// Apply the rule to full file text. Returns the rewritten text, the
    /// number of call sites changed, and any warnings for sites that were
    /// deliberately left alone.
    fn apply<'a>(&self, content: &'a str) -> (Cow<'a, str>, usize, Vec<String>) {
        let mut count = 0usize;
        let mut warnings = Vec::new();

        let rewritten: Cow<str> = match self.kind {
            RuleKind::ArrayListInit => {
                ARRAYLIST_INIT_RE.replace_all(content, |caps: &Captures| {
                    count += 1;
                    format!("std.ArrayList({}){{}}", &caps[1])
                })
            }

            RuleKind::HashMapInit => {
                HASHMAP_INIT_RE.replace_all(content, |caps: &Captures| {
                    count += 1;
                    format!("{}{{}}", &caps[1])
                })
            }

            RuleKind::LeadingAllocatorArg { method } => {
                let re = match method {
                    "append" => &*APPEND_RE,
                    "appendSlice" => &*APPEND_SLICE_RE,
                    "put" => &*PUT_RE,
                    _ => unreachable!("unknown method in rule table: {method}"),
                };
                re.replace_all(content, |caps: &Captures| {
                    let receiver = &caps[1];
                    let args = caps[2].trim();
                    if args.is_empty() || has_leading_allocator(args) {
                        return caps[0].to_string();
                    }
                    count += 1;
                    format!("{receiver}.{method}(allocator, {args})")
                })
            }

            RuleKind::ContainerDeinit => {
                DEINIT_RE.replace_all(content, |caps: &Captures| {
                    let receiver = &caps[1];
                    if looks_like_allocator(receiver) {
                        warnings.push(format!(
                            "left `{receiver}.deinit()` unchanged: receiver looks like an \
                             allocator, and an allocator's own deinit takes no argument"
                        ));
                        return caps[0].to_string();
                    }
                    count += 1;
                    format!("{receiver}.deinit(allocator)")
                })
            }

            RuleKind::ToOwnedSlice => {
                TO_OWNED_SLICE_RE.replace_all(content, |_: &Captures| {
                    count += 1;
                    ".toOwnedSlice(allocator)".to_string()
                })
            }
        };

        (rewritten, count, warnings)
    }
}

/// The fixed migration rule set, in application order.
///
/// Order matters only for readability here - the rules target disjoint call
/// shapes - but initialization rewrites are kept first so diffs read
/// top-down like the migration guide.
pub const RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "arraylist-init",
        summary: "ArrayList initialization: .init(allocator) -> {}",
        kind: RuleKind::ArrayListInit,
    },
    RewriteRule {
        name: "arraylist-append",
        summary: "ArrayList.append: added allocator parameter",
        kind: RuleKind::LeadingAllocatorArg { method: "append" },
    },
    RewriteRule {
        name: "arraylist-append-slice",
        summary: "ArrayList.appendSlice: added allocator parameter",
        kind: RuleKind::LeadingAllocatorArg {
            method: "appendSlice",
        },
    },
    RewriteRule {
        name: "container-deinit",
        summary: "Container.deinit: added allocator parameter",
        kind: RuleKind::ContainerDeinit,
    },
    RewriteRule {
        name: "hashmap-init",
        summary: "HashMap initialization: .init() -> {}",
        kind: RuleKind::HashMapInit,
    },
    RewriteRule {
        name: "hashmap-put",
        summary: "HashMap.put: added allocator parameter",
        kind: RuleKind::LeadingAllocatorArg { method: "put" },
    },
    RewriteRule {
        name: "to-owned-slice",
        summary: "toOwnedSlice: added allocator parameter",
        kind: RuleKind::ToOwnedSlice,
    },
];

/// How often one rule fired on one file.
#[derive(Debug, Clone)]
pub struct RuleApplication {
    pub rule: RewriteRule,
    pub count: usize,
}

/// Outcome of rewriting one file's text in memory.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub content: String,
    pub applications: Vec<RuleApplication>,
    pub warnings: Vec<String>,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        !self.applications.is_empty()
    }

    pub fn total_applications(&self) -> usize {
        self.applications.iter().map(|a| a.count).sum()
    }
}

/// Apply the full rule set, in order, to one file's text.
pub fn apply_rules(input: &str) -> RewriteOutcome {
    let mut content = input.to_string();
    let mut applications = Vec::new();
    let mut warnings = Vec::new();

    for rule in RULES {
        if !rule.applies_to(&content) {
            continue;
        }
        let (rewritten, count, mut rule_warnings) = rule.apply(&content);
        if count > 0 {
            content = rewritten.into_owned();
            applications.push(RuleApplication { rule: *rule, count });
        }
        warnings.append(&mut rule_warnings);
    }

    RewriteOutcome {
        content,
        applications,
        warnings,
    }
}

/// Per-file report from a rewrite run.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub applications: Vec<RuleApplication>,
    pub warnings: Vec<String>,
}

impl FileReport {
    pub fn changed(&self) -> bool {
        !self.applications.is_empty()
    }
}

/// Rewrite one file: read, transform in memory, write back unless `dry_run`
/// or nothing changed.
pub fn rewrite_file(path: &Path, dry_run: bool) -> Result<FileReport> {
    let original = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let outcome = apply_rules(&original);

    if outcome.changed() && !dry_run {
        fs::write(path, &outcome.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        applications: outcome.applications,
        warnings: outcome.warnings,
    })
}

/// Aggregate counters for a whole rewrite run.
#[derive(Debug, Default)]
pub struct FixSummary {
    pub files: usize,
    pub changed: usize,
    pub applications: usize,
    pub warnings: usize,
    pub errors: usize,
}

/// Rewrite a single file or a directory tree of source files.
///
/// Directory mode recurses over all files with the given extension in sorted
/// order. A file that cannot be read or written is reported and skipped; one
/// bad file never aborts the batch. Returns the aggregate summary; per-file
/// details go through `report` as they are produced.
pub fn run_fix<F>(
    target: &Path,
    extension: &str,
    dry_run: bool,
    mut report: F,
) -> Result<FixSummary>
where
    F: FnMut(&FileReport),
{
    let sources = crate::documents::collect_sources(target, extension)?;

    let mut summary = FixSummary::default();

    for path in &sources {
        summary.files += 1;
        match rewrite_file(path, dry_run) {
            Ok(file_report) => {
                if file_report.changed() {
                    summary.changed += 1;
                    summary.applications += file_report
                        .applications
                        .iter()
                        .map(|a| a.count)
                        .sum::<usize>();
                }
                summary.warnings += file_report.warnings.len();
                report(&file_report);
            }
            Err(e) => {
                summary.errors += 1;
                crate::reporting::error(&format!("{:#}", e));
            }
        }
    }

    Ok(summary)
}
