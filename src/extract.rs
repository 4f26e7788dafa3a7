use crate::config::GuideConfig;
use crate::documents::{chapter_title, collect_documents};
use crate::extractor::extract_code_blocks;
use crate::manifest::Manifest;
use crate::{reporting, scaffold};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one extraction run, mirroring the CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Report the plan without touching the filesystem
    pub dry_run: bool,
    /// Do not generate the build descriptor
    pub skip_build: bool,
    /// Do not generate the index document
    pub skip_readme: bool,
}

/// A file the run wrote, or would write in dry-run mode. Dry-run and real
/// runs produce the identical list; the only difference is the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub filename: String,
    pub bytes: usize,
}

/// Result of one extraction run.
#[derive(Debug)]
pub struct ExtractSummary {
    /// Documents successfully processed
    pub documents: usize,
    /// Examples extracted (or planned)
    pub examples: usize,
    /// Every output file with its byte count, in write order
    pub files: Vec<PlannedFile>,
    /// Documents that could not be read
    pub errors: usize,
    /// The manifest the run produced
    pub manifest: Manifest,
}

/// Default output directory for a chapter: `examples/{input name}`.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let name = input
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("chapter");
    Path::new("examples").join(name)
}

/// Extract all runnable examples under `input` into `output_dir`.
///
/// Reads every document in reading order, accumulates one [`Manifest`]
/// across them, writes one file per example plus the scaffold, and prints a
/// per-file listing as it goes. Unreadable documents are reported and
/// skipped; the run fails only when the input path itself is unusable or no
/// document could be read at all.
///
/// Re-running over the same input is idempotent: the output directory is
/// created only if absent and existing files are overwritten in place.
pub fn run_extract(
    input: &Path,
    output_dir: &Path,
    config: &GuideConfig,
    options: &ExtractOptions,
) -> Result<ExtractSummary> {
    let documents = collect_documents(input, config)?;
    let extension = config.file_extension();

    log::info!(
        "Extracting from {} document(s) under {}",
        documents.len(),
        input.display()
    );

    let mut manifest = Manifest::new();
    let mut processed = 0usize;
    let mut errors = 0usize;

    for document in &documents {
        let content = match fs::read_to_string(document) {
            Ok(content) => content,
            Err(e) => {
                reporting::error(&format!("Failed to read {}: {}", document.display(), e));
                errors += 1;
                continue;
            }
        };

        let blocks = extract_code_blocks(&content, &config.fence_markers);
        let runnable = blocks.iter().filter(|b| b.is_runnable()).count();
        log::debug!(
            "{}: {} block(s), {} runnable",
            document.display(),
            blocks.len(),
            runnable
        );

        manifest.push_document(document, &blocks, &extension);
        processed += 1;
    }

    if processed == 0 {
        anyhow::bail!("No document under {} could be read", input.display());
    }

    if !options.dry_run {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    }

    let mut files = Vec::new();
    let action = if options.dry_run { "would write" } else { "wrote" };

    for example in manifest.iter() {
        let path = output_dir.join(example.filename());
        if !options.dry_run {
            fs::write(&path, example.body())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        println!(
            "  [{}/{}] {} {} ({} bytes, {})",
            example.ordinal(),
            manifest.len(),
            action,
            example.filename(),
            example.byte_count(),
            example.display_title(),
        );
        files.push(PlannedFile {
            filename: example.filename().to_string(),
            bytes: example.byte_count(),
        });
    }

    let chapter = chapter_title(input);

    if !options.skip_build {
        let script = scaffold::render_build_script(&manifest);
        files.push(PlannedFile {
            filename: scaffold::BUILD_FILENAME.to_string(),
            bytes: script.len(),
        });
        if !options.dry_run {
            scaffold::write_build_script(output_dir, &manifest)?;
        }
        println!("  {} {} ({} bytes)", action, scaffold::BUILD_FILENAME, script.len());
    }

    if !options.skip_readme {
        let index = scaffold::render_index(&manifest, &chapter);
        files.push(PlannedFile {
            filename: scaffold::INDEX_FILENAME.to_string(),
            bytes: index.len(),
        });
        if !options.dry_run {
            scaffold::write_index(output_dir, &manifest, &chapter)?;
        }
        println!("  {} {} ({} bytes)", action, scaffold::INDEX_FILENAME, index.len());
    }

    let examples = manifest.len();
    Ok(ExtractSummary {
        documents: processed,
        examples,
        files,
        errors,
        manifest,
    })
}
