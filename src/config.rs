use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the optional per-guide configuration file.
pub const CONFIG_FILENAME: &str = "guide-tools.toml";

/// Configuration for the guide tooling.
///
/// Loaded from an optional `guide-tools.toml` next to the input path (or in
/// the working directory); every field has a default matching the Zig guide
/// layout, so most invocations run without any configuration file at all.
///
/// # Example
///
/// ```toml
/// fence_markers = ["zig"]
/// content_filename = "content.md"
/// extension = ".zig"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuideConfig {
    /// Fence markers that identify extractable blocks in markdown
    pub fence_markers: Vec<String>,

    /// Per-chapter document filename looked up inside chapter directories
    pub content_filename: String,

    /// Extension for extracted files, with leading dot; derived from the
    /// first fence marker when not set
    pub extension: Option<String>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            fence_markers: vec!["zig".to_string()],
            content_filename: "content.md".to_string(),
            extension: None,
        }
    }
}

impl GuideConfig {
    /// Load configuration for an invocation targeting `input`.
    ///
    /// Looks for [`CONFIG_FILENAME`] in the directory containing `input`
    /// (or `input` itself, when it is a directory), then in the current
    /// working directory. Absent file means defaults; an unparsable or
    /// invalid file is an error.
    pub fn load_for(input: &Path) -> Result<Self> {
        let mut candidates = Vec::new();

        if input.is_dir() {
            candidates.push(input.join(CONFIG_FILENAME));
        } else if let Some(parent) = input.parent() {
            candidates.push(parent.join(CONFIG_FILENAME));
        }
        candidates.push(Path::new(CONFIG_FILENAME).to_path_buf());

        for candidate in candidates {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Parse and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: GuideConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate the configuration for correctness
    pub fn validate(&self) -> Result<()> {
        if self.fence_markers.is_empty() {
            anyhow::bail!("Configuration must have at least one fence marker");
        }

        if self.fence_markers.iter().any(|m| m.trim().is_empty()) {
            anyhow::bail!("Fence markers cannot be empty");
        }

        if self.content_filename.is_empty() {
            anyhow::bail!("Content filename cannot be empty");
        }

        if self.content_filename.contains(['/', '\\']) {
            anyhow::bail!(
                "Content filename cannot contain path separators: {}",
                self.content_filename
            );
        }

        if let Some(ext) = &self.extension {
            if !ext.starts_with('.') || ext.len() < 2 {
                anyhow::bail!("Extension must start with a dot: {}", ext);
            }
        }

        Ok(())
    }

    /// Returns the extension for extracted files (e.g., ".zig").
    ///
    /// Uses the configured override when present, otherwise derives it from
    /// the first fence marker.
    pub fn file_extension(&self) -> String {
        if let Some(ext) = &self.extension {
            return ext.clone();
        }
        match self.fence_markers.first().map(String::as_str) {
            Some("zig") => ".zig".to_string(),
            Some("c" | "h") => ".c".to_string(),
            Some("cpp" | "c++" | "cxx") => ".cpp".to_string(),
            Some("rust" | "rs") => ".rs".to_string(),
            Some("python" | "py") => ".py".to_string(),
            Some("javascript" | "js") => ".js".to_string(),
            Some("typescript" | "ts") => ".ts".to_string(),
            Some("go") => ".go".to_string(),
            Some(other) => format!(".{}", other),
            None => ".txt".to_string(),
        }
    }
}
