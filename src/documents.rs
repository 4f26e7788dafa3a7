use crate::config::GuideConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve an input path to the ordered list of markdown documents to
/// process.
///
/// - A file is processed on its own.
/// - A directory containing markdown files directly (a chapter directory,
///   or any folder of documents) yields those files in sorted order.
/// - Otherwise its subdirectories are treated as chapters and each
///   contributes its `content_filename`, in sorted order.
///
/// An input that resolves to zero documents is an error: the caller has
/// pointed the tool at something that is not part of the guide.
pub fn collect_documents(input: &Path, config: &GuideConfig) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        anyhow::bail!("Path does not exist: {}", input.display());
    }

    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut documents: Vec<PathBuf> = read_dir_sorted(input)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "md"))
        .collect();

    if documents.is_empty() {
        for subdir in read_dir_sorted(input)?.into_iter().filter(|p| p.is_dir()) {
            let content = subdir.join(&config.content_filename);
            if content.is_file() {
                documents.push(content);
            }
        }
    }

    if documents.is_empty() {
        anyhow::bail!(
            "No markdown documents found under {} (looked for *.md and {}/{})",
            input.display(),
            "<chapter>",
            config.content_filename
        );
    }

    Ok(documents)
}

/// Recursively collect source files with the given extension (e.g. ".zig")
/// under `root`, in sorted order. A single-file root is returned as-is when
/// it matches.
pub fn collect_sources(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }

    let wanted = extension.trim_start_matches('.');

    if root.is_file() {
        if root.extension().is_some_and(|e| e == wanted) {
            return Ok(vec![root.to_path_buf()]);
        }
        anyhow::bail!(
            "Not a {} file: {}",
            extension,
            root.display()
        );
    }

    let mut sources = Vec::new();
    collect_sources_into(root, wanted, &mut sources)?;
    sources.sort();

    if sources.is_empty() {
        anyhow::bail!(
            "No {} files found under {}",
            extension,
            root.display()
        );
    }

    Ok(sources)
}

fn collect_sources_into(dir: &Path, wanted: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    for path in read_dir_sorted(dir)? {
        if path.is_dir() {
            collect_sources_into(&path, wanted, out)?;
        } else if path.extension().is_some_and(|e| e == wanted) {
            out.push(path);
        }
    }
    Ok(())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}

/// Human-readable chapter title for an input path:
/// `sections/04_collections_containers` becomes `04 Collections Containers`.
pub fn chapter_title(input: &Path) -> String {
    let name = input
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("chapter");

    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label for one document in reports: the chapter directory name for
/// `content.md`-style documents, the file stem otherwise.
pub fn document_label(path: &Path, config: &GuideConfig) -> String {
    let is_content = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == config.content_filename);

    if is_content {
        if let Some(parent) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
            return parent.to_string();
        }
    }

    path.file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string()
}
