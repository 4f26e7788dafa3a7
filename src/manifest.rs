use crate::extractor::CodeBlock;
use std::path::{Path, PathBuf};

/// A runnable block materialized as a standalone example file.
///
/// One `Example` corresponds to exactly one [`CodeBlock`] classified as
/// runnable. The ordinal is the example's 1-based position in the run's
/// reading order and makes the synthesized filename unique even when two
/// headings produce the same slug.
#[derive(Debug, Clone)]
pub struct Example {
    ordinal: usize,
    title: Option<String>,
    filename: String,
    body: String,
    source: PathBuf,
    start_line: usize,
    end_line: usize,
}

impl Example {
    /// Builds the example for a runnable block.
    ///
    /// The filename is `{ordinal:02}_{slug}{extension}`, where the slug is
    /// the slugified nearest-heading text, falling back to
    /// `example_{ordinal}` when no heading precedes the block (or the
    /// heading slugifies to nothing).
    pub fn from_block(ordinal: usize, block: &CodeBlock, source: &Path, extension: &str) -> Self {
        let title = block.heading.as_ref().map(|h| h.text.clone());

        let slug = match title.as_deref().map(slugify) {
            Some(s) if !s.is_empty() => s,
            _ => format!("example_{}", ordinal),
        };

        Self {
            ordinal,
            title,
            filename: format!("{:02}_{}{}", ordinal, slug, extension),
            body: block.code.clone(),
            source: source.to_path_buf(),
            start_line: block.start_line,
            end_line: block.end_line,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The heading text this example was titled from, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Human-readable title for the index; falls back to `Example N`.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(t) => t.clone(),
            None => format!("Example {}", self.ordinal),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Filename stem, used as the build target name.
    pub fn target_name(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }

    /// The block body, byte-for-byte as it appeared between the fences.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn byte_count(&self) -> usize {
        self.body.len()
    }

    pub fn line_count(&self) -> usize {
        self.body.lines().count()
    }

    /// Document this example was extracted from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Source line range of the block, fences included.
    pub fn source_lines(&self) -> (usize, usize) {
        (self.start_line, self.end_line)
    }
}

/// Ordered record of all examples produced by one extraction run.
///
/// Insertion order is reading order and is preserved into the generated
/// index and build descriptor.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    examples: Vec<Example>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the runnable blocks of one document, continuing the ordinal
    /// sequence across documents so filenames stay unique in a shared
    /// output directory.
    pub fn push_document(&mut self, source: &Path, blocks: &[CodeBlock], extension: &str) {
        for block in blocks.iter().filter(|b| b.is_runnable()) {
            let ordinal = self.examples.len() + 1;
            self.examples
                .push(Example::from_block(ordinal, block, source, extension));
        }
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Convert a heading title to a filesystem-safe token: lowercased, with
/// runs of non-alphanumeric characters collapsed to a single underscore.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_code_blocks;

    fn runnable_block_markdown(heading: &str) -> String {
        format!(
            "### {}\n\n```zig\nconst std = @import(\"std\");\n\npub fn main() void {{}}\n```\n",
            heading
        )
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Arena Basics"), "arena_basics");
        assert_eq!(slugify("Example 1: ArrayList & Friends"), "example_1_arraylist_friends");
        assert_eq!(slugify("  Spaces   everywhere  "), "spaces_everywhere");
        assert_eq!(slugify("C++ Interop"), "c_interop");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_filename_synthesis() {
        let markdown = runnable_block_markdown("Example 1: Arena Basics");
        let blocks = extract_code_blocks(&markdown, &["zig".to_string()]);
        let example = Example::from_block(1, &blocks[0], Path::new("content.md"), ".zig");

        assert_eq!(example.filename(), "01_example_1_arena_basics.zig");
        assert_eq!(example.target_name(), "01_example_1_arena_basics");
        assert_eq!(example.display_title(), "Example 1: Arena Basics");
    }

    #[test]
    fn test_fallback_title_without_heading() {
        let markdown = "```zig\nconst std = @import(\"std\");\n\npub fn main() void {}\n```\n";
        let blocks = extract_code_blocks(&markdown, &["zig".to_string()]);
        let example = Example::from_block(3, &blocks[0], Path::new("content.md"), ".zig");

        assert_eq!(example.filename(), "03_example_3.zig");
        assert_eq!(example.display_title(), "Example 3");
        assert!(example.title().is_none());
    }

    #[test]
    fn test_equal_slugs_disambiguated_by_ordinal() {
        let markdown = format!(
            "{}\n{}",
            runnable_block_markdown("Setup"),
            runnable_block_markdown("Setup")
        );
        let blocks = extract_code_blocks(&markdown, &["zig".to_string()]);

        let mut manifest = Manifest::new();
        manifest.push_document(Path::new("content.md"), &blocks, ".zig");

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.examples()[0].filename(), "01_setup.zig");
        assert_eq!(manifest.examples()[1].filename(), "02_setup.zig");
    }

    #[test]
    fn test_snippets_not_materialized() {
        let markdown = "### Intro\n\n```zig\nconst a = 1;\n```\n";
        let blocks = extract_code_blocks(&markdown, &["zig".to_string()]);

        let mut manifest = Manifest::new();
        manifest.push_document(Path::new("content.md"), &blocks, ".zig");
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_body_preserved_verbatim() {
        let markdown = runnable_block_markdown("Round Trip");
        let blocks = extract_code_blocks(&markdown, &["zig".to_string()]);
        let example = Example::from_block(1, &blocks[0], Path::new("content.md"), ".zig");

        assert_eq!(example.body(), blocks[0].code);
        assert_eq!(example.byte_count(), blocks[0].code.len());
    }
}
