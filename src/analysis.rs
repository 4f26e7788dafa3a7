use crate::config::GuideConfig;
use crate::documents::{collect_documents, document_label};
use crate::extractor::{extract_code_blocks, Classification, CodeBlock};
use crate::reporting;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-block detail carried into reports and the JSON dump.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub lines: usize,
    pub classification: Classification,
    pub title: Option<String>,
}

/// Statistics for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub chapter: String,
    pub path: PathBuf,
    pub total_blocks: usize,
    pub runnable_blocks: usize,
    pub snippet_blocks: usize,
    pub blocks: Vec<BlockReport>,
}

/// Statistics for a whole run: per-document reports plus corpus totals.
#[derive(Debug, Serialize)]
pub struct CorpusReport {
    pub documents: Vec<DocumentReport>,
    pub total_blocks: usize,
    pub runnable_blocks: usize,
    pub snippet_blocks: usize,
    #[serde(skip)]
    pub errors: usize,
}

/// Analyze one document.
pub fn analyze_document(path: &Path, config: &GuideConfig) -> Result<DocumentReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let blocks = extract_code_blocks(&content, &config.fence_markers);
    Ok(document_report(path, config, &blocks))
}

fn document_report(path: &Path, config: &GuideConfig, blocks: &[CodeBlock]) -> DocumentReport {
    let runnable = blocks.iter().filter(|b| b.is_runnable()).count();

    DocumentReport {
        chapter: document_label(path, config),
        path: path.to_path_buf(),
        total_blocks: blocks.len(),
        runnable_blocks: runnable,
        snippet_blocks: blocks.len() - runnable,
        blocks: blocks
            .iter()
            .enumerate()
            .map(|(i, b)| BlockReport {
                index: i + 1,
                start_line: b.start_line,
                end_line: b.end_line,
                lines: b.line_count(),
                classification: b.classification,
                title: b.heading.as_ref().map(|h| h.text.clone()),
            })
            .collect(),
    }
}

/// Analyze a document or directory of documents, print the report, and
/// optionally dump the detailed results as JSON.
///
/// A single-file input gets the detailed per-block view; a directory gets
/// the per-chapter table with corpus totals. Unreadable documents are
/// reported and skipped.
pub fn run_analyze(
    input: &Path,
    config: &GuideConfig,
    json_output: Option<&Path>,
) -> Result<CorpusReport> {
    let documents = collect_documents(input, config)?;

    let mut reports = Vec::new();
    let mut errors = 0usize;

    for document in &documents {
        match analyze_document(document, config) {
            Ok(report) => reports.push(report),
            Err(e) => {
                reporting::error(&format!("{:#}", e));
                errors += 1;
            }
        }
    }

    if reports.is_empty() {
        anyhow::bail!("No document under {} could be read", input.display());
    }

    if reports.len() == 1 && input.is_file() {
        print_document_detail(&reports[0]);
    } else {
        print_corpus_table(&reports);
    }

    let corpus = CorpusReport {
        total_blocks: reports.iter().map(|r| r.total_blocks).sum(),
        runnable_blocks: reports.iter().map(|r| r.runnable_blocks).sum(),
        snippet_blocks: reports.iter().map(|r| r.snippet_blocks).sum(),
        documents: reports,
        errors,
    };

    if let Some(json_path) = json_output {
        let file = fs::File::create(json_path)
            .with_context(|| format!("Failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &corpus.documents)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        reporting::info(&format!(
            "Detailed results saved to {}",
            json_path.display()
        ));
    }

    Ok(corpus)
}

fn print_document_detail(report: &DocumentReport) {
    println!("\n=== {} ===", report.chapter);
    println!("Total blocks: {}", report.total_blocks);
    println!("Runnable examples: {}", report.runnable_blocks);
    println!("Inline snippets: {}", report.snippet_blocks);

    let runnable: Vec<_> = report
        .blocks
        .iter()
        .filter(|b| b.classification == Classification::Runnable)
        .collect();

    if !runnable.is_empty() {
        println!("\n--- Runnable Examples ({}) ---", runnable.len());
        for block in runnable {
            println!(
                "  Block #{} (lines {}-{}, {} lines)",
                block.index, block.start_line, block.end_line, block.lines
            );
            if let Some(title) = &block.title {
                println!("    {}", title);
            }
        }
    }
}

fn print_corpus_table(reports: &[DocumentReport]) {
    println!("\n=== Code Block Analysis ===\n");
    println!(
        "{:<30} {:<8} {:<10} {:<10}",
        "Chapter", "Total", "Runnable", "Snippets"
    );
    println!("{}", "-".repeat(60));

    for report in reports {
        println!(
            "{:<30} {:<8} {:<10} {:<10}",
            report.chapter, report.total_blocks, report.runnable_blocks, report.snippet_blocks
        );
    }

    println!("{}", "-".repeat(60));
    println!(
        "{:<30} {:<8} {:<10} {:<10}",
        "TOTAL",
        reports.iter().map(|r| r.total_blocks).sum::<usize>(),
        reports.iter().map(|r| r.runnable_blocks).sum::<usize>(),
        reports.iter().map(|r| r.snippet_blocks).sum::<usize>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CHAPTER: &str = r#"# Memory

### Example 1: Arena

```zig
const std = @import("std");

pub fn main() !void {}
```

Some prose.

```zig
const hint = 1;
```
"#;

    #[test]
    fn test_counts_partition() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("content.md");
        fs::write(&doc, CHAPTER).unwrap();

        let config = GuideConfig::default();
        let report = analyze_document(&doc, &config).unwrap();

        assert_eq!(report.total_blocks, 2);
        assert_eq!(report.runnable_blocks, 1);
        assert_eq!(report.snippet_blocks, 1);
        assert_eq!(
            report.runnable_blocks + report.snippet_blocks,
            report.total_blocks
        );
    }

    #[test]
    fn test_corpus_totals() {
        let dir = TempDir::new().unwrap();
        for chapter in ["01_intro", "02_memory"] {
            let chapter_dir = dir.path().join(chapter);
            fs::create_dir(&chapter_dir).unwrap();
            fs::write(chapter_dir.join("content.md"), CHAPTER).unwrap();
        }

        let config = GuideConfig::default();
        let corpus = run_analyze(dir.path(), &config, None).unwrap();

        assert_eq!(corpus.documents.len(), 2);
        assert_eq!(corpus.total_blocks, 4);
        assert_eq!(corpus.runnable_blocks, 2);
        assert_eq!(corpus.snippet_blocks, 2);
    }

    #[test]
    fn test_json_dump_written() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("content.md");
        fs::write(&doc, CHAPTER).unwrap();
        let json_path = dir.path().join("analysis.json");

        let config = GuideConfig::default();
        run_analyze(&doc, &config, Some(&json_path)).unwrap();

        let dumped = fs::read_to_string(&json_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&dumped).unwrap();
        assert_eq!(parsed[0]["total_blocks"], 2);
        assert_eq!(parsed[0]["blocks"][0]["classification"], "runnable");
    }
}
