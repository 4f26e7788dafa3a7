use crate::manifest::Manifest;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Filename of the generated build descriptor.
pub const BUILD_FILENAME: &str = "build.zig";

/// Filename of the generated index document.
pub const INDEX_FILENAME: &str = "README.md";

/// Renders the `build.zig` build descriptor for an output directory.
///
/// Every example becomes an independently buildable executable with its own
/// `run-{name}` step; a `test` step is always present. An empty manifest
/// degenerates to an empty target list and stays valid Zig - `zig build`
/// in an empty example directory must succeed, not error.
pub fn render_build_script(manifest: &Manifest) -> String {
    let mut script = String::from(
        "const std = @import(\"std\");\n\
         \n\
         pub fn build(b: *std.Build) void {\n\
         \x20   const target = b.standardTargetOptions(.{});\n\
         \x20   const optimize = b.standardOptimizeOption(.{});\n\
         \n\
         \x20   const examples = [_][]const u8{\n",
    );

    for example in manifest.iter() {
        script.push_str("        \"");
        script.push_str(example.target_name());
        script.push_str("\",\n");
    }

    script.push_str(
        "    };\n\
         \n\
         \x20   inline for (examples) |example_name| {\n\
         \x20       const exe = b.addExecutable(.{\n\
         \x20           .name = example_name,\n\
         \x20           .root_module = b.createModule(.{\n\
         \x20               .root_source_file = b.path(example_name ++ \".zig\"),\n\
         \x20               .target = target,\n\
         \x20               .optimize = optimize,\n\
         \x20           }),\n\
         \x20       });\n\
         \x20       b.installArtifact(exe);\n\
         \n\
         \x20       const run_cmd = b.addRunArtifact(exe);\n\
         \x20       run_cmd.step.dependOn(b.getInstallStep());\n\
         \x20       if (b.args) |args| {\n\
         \x20           run_cmd.addArgs(args);\n\
         \x20       }\n\
         \n\
         \x20       const run_step = b.step(\"run-\" ++ example_name, \"Run the \" ++ example_name ++ \" example\");\n\
         \x20       run_step.dependOn(&run_cmd.step);\n\
         \x20   }\n\
         \n\
         \x20   const test_step = b.step(\"test\", \"Run all tests\");\n\
         \x20   _ = test_step;\n\
         }\n",
    );

    script
}

/// Renders the `README.md` index for an output directory.
///
/// Lists every example in manifest order: filename, derived title, body line
/// count, and the source line range in the chapter document. An empty
/// manifest yields the table header with no rows.
pub fn render_index(manifest: &Manifest, chapter: &str) -> String {
    let mut readme = format!(
        "# {chapter} - Examples\n\
         \n\
         This directory contains runnable examples extracted from {chapter}.\n\
         \n\
         ## Building Examples\n\
         \n\
         Build all examples:\n\
         ```bash\n\
         zig build\n\
         ```\n\
         \n\
         Run a specific example:\n\
         ```bash\n"
    );

    if let Some(first) = manifest.examples().first() {
        readme.push_str("zig build run-");
        readme.push_str(first.target_name());
        readme.push('\n');
    }

    readme.push_str(
        "# etc...\n\
         ```\n\
         \n\
         ## Examples Overview\n\
         \n\
         | File | Description | Lines | Source |\n\
         |------|-------------|-------|--------|\n",
    );

    for example in manifest.iter() {
        let (start, end) = example.source_lines();
        readme.push_str(&format!(
            "| `{}` | {} | {} | Lines {}-{} |\n",
            example.filename(),
            example.display_title(),
            example.line_count(),
            start,
            end,
        ));
    }

    readme.push_str(
        "\n\
         ## Related Book Sections\n\
         \n\
         These examples correspond to code blocks in the chapter's markdown source.\n",
    );

    readme
}

/// Write the build descriptor into `output_dir`.
pub fn write_build_script(output_dir: &Path, manifest: &Manifest) -> Result<()> {
    let path = output_dir.join(BUILD_FILENAME);
    fs::write(&path, render_build_script(manifest))
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the index document into `output_dir`.
pub fn write_index(output_dir: &Path, manifest: &Manifest, chapter: &str) -> Result<()> {
    let path = output_dir.join(INDEX_FILENAME);
    fs::write(&path, render_index(manifest, chapter))
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_code_blocks;
    use std::path::Path;

    fn manifest_from(markdown: &str) -> Manifest {
        let blocks = extract_code_blocks(markdown, &["zig".to_string()]);
        let mut manifest = Manifest::new();
        manifest.push_document(Path::new("content.md"), &blocks, ".zig");
        manifest
    }

    #[test]
    fn test_build_script_lists_targets_in_order() {
        let markdown = "### First\n\n```zig\nconst std = @import(\"std\");\npub fn main() void {}\n```\n\n\
                        ### Second\n\n```zig\nconst std = @import(\"std\");\npub fn main() void {}\n```\n";
        let manifest = manifest_from(markdown);
        let script = render_build_script(&manifest);

        let first = script.find("\"01_first\"").unwrap();
        let second = script.find("\"02_second\"").unwrap();
        assert!(first < second);
        assert!(script.contains("inline for (examples) |example_name|"));
    }

    #[test]
    fn test_empty_manifest_build_script_is_valid() {
        let script = render_build_script(&Manifest::new());

        // Degenerate but well-formed: empty target array, test step intact
        assert!(script.contains("const examples = [_][]const u8{\n    };"));
        assert!(script.contains("const test_step = b.step(\"test\""));
    }

    #[test]
    fn test_index_rows_in_manifest_order() {
        let markdown = "### Alpha\n\n```zig\nconst std = @import(\"std\");\npub fn main() void {}\n```\n\n\
                        ### Beta\n\n```zig\nconst std = @import(\"std\");\npub fn main() void {}\n```\n";
        let manifest = manifest_from(markdown);
        let index = render_index(&manifest, "03 Memory");

        assert!(index.starts_with("# 03 Memory - Examples"));
        let alpha = index.find("| `01_alpha.zig` | Alpha |").unwrap();
        let beta = index.find("| `02_beta.zig` | Beta |").unwrap();
        assert!(alpha < beta);
        assert!(index.contains("zig build run-01_alpha"));
    }

    #[test]
    fn test_empty_manifest_index_has_header_only() {
        let index = render_index(&Manifest::new(), "99 Empty");

        assert!(index.contains("| File | Description | Lines | Source |"));
        // Header and separator, then a blank line - no data rows
        let table_rows = index
            .lines()
            .filter(|l| l.starts_with("| `"))
            .count();
        assert_eq!(table_rows, 0);
        assert!(!index.contains("zig build run-"));
    }
}
