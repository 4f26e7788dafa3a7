use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::exit;
use zig_guide_tools::config::GuideConfig;
use zig_guide_tools::extract::{default_output_dir, run_extract, ExtractOptions};
use zig_guide_tools::{analysis, reporting, rewrite};

#[derive(Parser)]
#[command(
    name = "zig-guide-tools",
    version,
    about = "Extract runnable examples from guide chapters and keep them API-compatible"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract runnable code blocks from markdown chapters into standalone
    /// example files with a build scaffold
    Extract {
        /// Chapter directory or markdown file to extract from
        chapter_dir: PathBuf,

        /// Output directory (default: examples/{chapter name})
        output_dir: Option<PathBuf>,

        /// Report what would be extracted without writing files
        #[arg(long)]
        dry_run: bool,

        /// Skip generating build.zig
        #[arg(long)]
        skip_build: bool,

        /// Skip generating README.md
        #[arg(long)]
        skip_readme: bool,
    },

    /// Rewrite deprecated API call shapes in .zig files to the current
    /// dialect
    Fix {
        /// File or directory to fix
        path: PathBuf,

        /// Report what would be changed without modifying files
        #[arg(long)]
        dry_run: bool,
    },

    /// Report code block statistics for a document or chapter tree
    Analyze {
        /// Markdown file or directory to analyze
        path: PathBuf,

        /// Write detailed per-block results to this JSON file
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
}

pub fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            chapter_dir,
            output_dir,
            dry_run,
            skip_build,
            skip_readme,
        } => {
            let config = GuideConfig::load_for(&chapter_dir)?;
            let output_dir = output_dir.unwrap_or_else(|| default_output_dir(&chapter_dir));
            let options = ExtractOptions {
                dry_run,
                skip_build,
                skip_readme,
            };

            let summary = run_extract(&chapter_dir, &output_dir, &config, &options)?;
            reporting::report_extract_summary(&summary, &output_dir, dry_run);
        }

        Commands::Fix { path, dry_run } => {
            let config = GuideConfig::load_for(&path)?;
            let summary = rewrite::run_fix(&path, &config.file_extension(), dry_run, |report| {
                if report.changed() {
                    let prefix = if dry_run { "[DRY RUN] " } else { "" };
                    println!("{}Fixed: {}", prefix, report.path.display());
                    for application in &report.applications {
                        println!("    - {} ({})", application.rule.summary(), application.count);
                    }
                }
                for warning in &report.warnings {
                    reporting::warn(&format!("{}: {}", report.path.display(), warning));
                }
            })?;
            reporting::report_fix_summary(&summary, dry_run);
        }

        Commands::Analyze { path, json } => {
            let config = GuideConfig::load_for(&path)?;
            analysis::run_analyze(&path, &config, json.as_deref())?;
        }
    }

    Ok(())
}
