use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// A fenced code block extracted from a guide chapter, with its metadata.
///
/// Blocks are identified by fenced code syntax in markdown:
///
/// ````markdown
/// ### Example 1: Hello
///
/// ```zig
/// const std = @import("std");
///
/// pub fn main() void {}
/// ```
/// ````
///
/// # Attributes
///
/// Fences can carry comma-separated attributes in the info string:
///
/// - `ignore` - Never treat this block as a runnable example
///
/// # Classification
///
/// Every block is classified exactly once, at parse time, as either
/// [`Classification::Runnable`] or [`Classification::Snippet`]. The test is
/// purely syntactic (see [`classify`]); blocks that would compile but use
/// unusual formatting are accepted false negatives, fixed by hand in the
/// guide source.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    /// The language from the fence marker (e.g., "zig")
    pub language: String,
    /// The block body, exactly as it appears between the fences
    pub code: String,
    /// 1-based line of the opening fence
    pub start_line: usize,
    /// 1-based line of the closing fence
    pub end_line: usize,
    /// Nearest heading above the block, if any
    pub heading: Option<Heading>,
    /// Runnable example or illustrative snippet
    pub classification: Classification,
}

impl CodeBlock {
    /// Number of lines in the block body.
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }

    pub fn is_runnable(&self) -> bool {
        self.classification == Classification::Runnable
    }
}

/// A markdown heading, used to attribute a title to the blocks that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1-6
    pub level: u8,
    /// The literal heading text
    pub text: String,
    /// 1-based source line
    pub line: usize,
}

/// How a block may be used: extracted as a standalone example, or left in
/// the prose as an illustration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Runnable,
    Snippet,
}

/// Zig entry-point marker: a block with a `main` can build as an executable.
const ENTRY_POINT_MARKER: &str = "pub fn main(";

/// Decides whether a block body is a complete, standalone example.
///
/// A block is runnable iff it declares an entry point (`pub fn main(`) or a
/// standalone test (`test "..."` / `test { ... }` at the start of a line),
/// and imports at least one module - a body without `@import` cannot compile
/// on its own, no matter how complete it looks.
///
/// This is a conservative line-oriented check, not a parse of the body.
pub fn classify(code: &str) -> Classification {
    let has_entry_point = code.contains(ENTRY_POINT_MARKER);
    let has_test_decl = code.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with("test \"") || trimmed.starts_with("test {")
    });
    let has_import = code.contains("@import");

    if (has_entry_point || has_test_decl) && has_import {
        Classification::Runnable
    } else {
        Classification::Snippet
    }
}

/// Extracts fenced code blocks matching `fence_markers` from one markdown
/// document, in document order.
///
/// Each block is attributed to the nearest preceding heading (of any level)
/// and classified via [`classify`]. Whitespace-only blocks are dropped.
/// Indented code blocks and fences with non-matching language tags are
/// skipped entirely.
///
/// # Example
///
/// ```ignore
/// let blocks = extract_code_blocks(markdown, &["zig".to_string()]);
/// assert_eq!(blocks.len(), 1);
/// assert!(blocks[0].is_runnable());
/// ```
pub fn extract_code_blocks(content: &str, fence_markers: &[String]) -> Vec<CodeBlock> {
    let line_starts = line_starts(content);
    let parser = Parser::new_ext(content, Options::empty());

    let mut blocks = Vec::new();
    let mut current_heading: Option<Heading> = None;

    let mut in_matching_block = false;
    let mut forced_snippet = false;
    let mut block_language = String::new();
    let mut block_code = String::new();
    let mut block_start_line = 0;
    let mut block_end_line = 0;

    let mut in_heading = false;
    let mut heading_level = 0u8;
    let mut heading_line = 0;
    let mut heading_text = String::new();

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = true;
                heading_level = level as u8;
                heading_line = line_of(&line_starts, range.start);
                heading_text.clear();
            }

            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
                current_heading = Some(Heading {
                    level: heading_level,
                    text: heading_text.trim().to_string(),
                    line: heading_line,
                });
            }

            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let (language, flags) = parse_fence_info(info.as_ref());
                if !fence_markers.iter().any(|m| m == &language) {
                    continue;
                }

                in_matching_block = true;
                forced_snippet = flags.contains(&"ignore");
                block_language = language;
                block_code.clear();
                // The Start event's range spans the whole block, fences included
                block_start_line = line_of(&line_starts, range.start);
                block_end_line = line_of(&line_starts, range.end.saturating_sub(1));
            }

            Event::End(TagEnd::CodeBlock) => {
                if in_matching_block {
                    if !block_code.trim().is_empty() {
                        let classification = if forced_snippet {
                            Classification::Snippet
                        } else {
                            classify(&block_code)
                        };
                        blocks.push(CodeBlock {
                            language: block_language.clone(),
                            code: block_code.clone(),
                            start_line: block_start_line,
                            end_line: block_end_line,
                            heading: current_heading.clone(),
                            classification,
                        });
                    }
                    in_matching_block = false;
                }
            }

            Event::Text(text) => {
                if in_matching_block {
                    block_code.push_str(&text);
                } else if in_heading {
                    heading_text.push_str(&text);
                }
            }

            Event::Code(text) => {
                if in_heading {
                    heading_text.push_str(&text);
                }
            }

            _ => {}
        }
    }

    blocks
}

/// Parse fence info string into language and flags
/// Examples:
/// - "zig" -> ("zig", [])
/// - "zig,ignore" -> ("zig", ["ignore"])
fn parse_fence_info(info: &str) -> (String, Vec<&str>) {
    let parts: Vec<&str> = info.split(',').map(|s| s.trim()).collect();

    if parts.is_empty() {
        return (String::new(), Vec::new());
    }

    let language = parts[0].to_string();
    let flags = parts[1..].to_vec();

    (language, flags)
}

/// Byte offsets at which each line begins, for offset -> line translation.
fn line_starts(content: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// 1-based line containing the given byte offset.
fn line_of(line_starts: &[usize], offset: usize) -> usize {
    line_starts.partition_point(|&start| start <= offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zig_markers() -> Vec<String> {
        vec!["zig".to_string()]
    }

    #[test]
    fn test_extract_simple_block() {
        let markdown = r#"
# Test

```zig
const std = @import("std");

pub fn main() void {}
```
"#;

        let blocks = extract_code_blocks(markdown, &zig_markers());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "zig");
        assert!(blocks[0].code.contains("pub fn main()"));
        assert_eq!(blocks[0].classification, Classification::Runnable);
    }

    #[test]
    fn test_non_matching_fences_skipped() {
        let markdown = r#"
```bash
zig build
```

```zig
const x: u8 = 1;
```
"#;

        let blocks = extract_code_blocks(markdown, &zig_markers());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "zig");
    }

    #[test]
    fn test_heading_attribution() {
        let markdown = r#"
## Setup

Some prose.

### Example 1: Arena Basics

```zig
const std = @import("std");

pub fn main() !void {}
```
"#;

        let blocks = extract_code_blocks(markdown, &zig_markers());
        assert_eq!(blocks.len(), 1);
        let heading = blocks[0].heading.as_ref().unwrap();
        assert_eq!(heading.text, "Example 1: Arena Basics");
        assert_eq!(heading.level, 3);
    }

    #[test]
    fn test_block_without_heading() {
        let markdown = "```zig\nconst a = 1;\n```\n";

        let blocks = extract_code_blocks(markdown, &zig_markers());
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].heading.is_none());
    }

    #[test]
    fn test_line_numbers_cover_fences() {
        let markdown = "prose\n\n```zig\nconst a = 1;\nconst b = 2;\n```\n";

        let blocks = extract_code_blocks(markdown, &zig_markers());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 3);
        assert_eq!(blocks[0].end_line, 6);
        assert_eq!(blocks[0].line_count(), 2);
    }

    #[test]
    fn test_empty_block_dropped() {
        let markdown = "```zig\n\n```\n\n```zig\nconst a = 1;\n```\n";

        let blocks = extract_code_blocks(markdown, &zig_markers());
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_ignore_flag_forces_snippet() {
        let markdown = r#"
```zig,ignore
const std = @import("std");

pub fn main() void {}
```
"#;

        let blocks = extract_code_blocks(markdown, &zig_markers());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].classification, Classification::Snippet);
    }

    #[test]
    fn test_classify_requires_import() {
        // A main without @import cannot build standalone
        let snippet = "pub fn main() void {}\n";
        assert_eq!(classify(snippet), Classification::Snippet);

        let runnable = "const std = @import(\"std\");\n\npub fn main() void {}\n";
        assert_eq!(classify(runnable), Classification::Runnable);
    }

    #[test]
    fn test_classify_test_declaration() {
        let code = "const std = @import(\"std\");\n\ntest \"addition\" {\n    try std.testing.expect(1 + 1 == 2);\n}\n";
        assert_eq!(classify(code), Classification::Runnable);

        // The word `test` in prose or a comment is not a declaration
        let commented = "const std = @import(\"std\");\n// run the test suite with zig build test\nconst x = 1;\n";
        assert_eq!(classify(commented), Classification::Snippet);
    }

    #[test]
    fn test_parse_fence_info() {
        let (lang, flags) = parse_fence_info("zig");
        assert_eq!(lang, "zig");
        assert!(flags.is_empty());

        let (lang, flags) = parse_fence_info("zig,ignore");
        assert_eq!(lang, "zig");
        assert_eq!(flags, vec!["ignore"]);
    }

    #[test]
    fn test_classification_partitions_blocks() {
        let markdown = r#"
```zig
const a = 1;
```

```zig
const std = @import("std");

pub fn main() void {}
```

```zig
const b = 2;
```
"#;

        let blocks = extract_code_blocks(markdown, &zig_markers());
        let runnable = blocks.iter().filter(|b| b.is_runnable()).count();
        let snippets = blocks
            .iter()
            .filter(|b| b.classification == Classification::Snippet)
            .count();
        assert_eq!(runnable + snippets, blocks.len());
        assert_eq!(runnable, 1);
        assert_eq!(snippets, 2);
    }
}
