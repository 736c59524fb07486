//! pagediff CLI - visual document comparison tool

use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagediff::{
    ComparisonResult, FuzzyOptions, LoaderRegistry, Pagediff, Progress, Side, Stage, Workspace,
};

#[derive(Parser)]
#[command(name = "pagediff")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Highlight differences between two paginated documents", long_about = None)]
struct Cli {
    /// Original document
    #[arg(value_name = "ORIGINAL")]
    original: Option<PathBuf>,

    /// Modified document
    #[arg(value_name = "MODIFIED")]
    modified: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents and write annotated pages
    Compare {
        /// Original document
        #[arg(value_name = "ORIGINAL")]
        original: PathBuf,

        /// Modified document
        #[arg(value_name = "MODIFIED")]
        modified: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Write into a new compare_<timestamp> directory under the output
        #[arg(long)]
        timestamped: bool,

        /// Output resolution
        #[arg(long, default_value = "150", env = "PAGEDIFF_DPI")]
        dpi: f32,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Place changed words using recognized tokens from the inputs
        #[arg(long)]
        ocr: bool,

        /// Token similarity a match must exceed (0-1)
        #[arg(long, default_value = "0.85", requires = "ocr")]
        min_similarity: f64,

        /// Minimum token confidence (0-100)
        #[arg(long, default_value = "60", requires = "ocr")]
        min_confidence: f32,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

struct CompareArgs {
    output: Option<PathBuf>,
    timestamped: bool,
    dpi: f32,
    sequential: bool,
    fuzzy: Option<FuzzyOptions>,
    json: bool,
}

impl Default for CompareArgs {
    fn default() -> Self {
        Self {
            output: None,
            timestamped: false,
            dpi: pagediff::pipeline::DEFAULT_DPI,
            sequential: false,
            fuzzy: None,
            json: false,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Compare {
            original,
            modified,
            output,
            timestamped,
            dpi,
            sequential,
            ocr,
            min_similarity,
            min_confidence,
            json,
        }) => {
            let fuzzy = ocr.then(|| {
                FuzzyOptions::new()
                    .with_min_similarity(min_similarity)
                    .with_min_confidence(min_confidence)
            });
            cmd_compare(
                &original,
                &modified,
                CompareArgs {
                    output,
                    timestamped,
                    dpi,
                    sequential,
                    fuzzy,
                    json,
                },
            )
        }
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: compare if both inputs are provided
            match (cli.original, cli.modified) {
                (Some(original), Some(modified)) => cmd_compare(
                    &original,
                    &modified,
                    CompareArgs {
                        output: cli.output,
                        ..CompareArgs::default()
                    },
                ),
                _ => {
                    println!("{}", "Usage: pagediff <ORIGINAL> <MODIFIED> [OUTPUT]".yellow());
                    println!("       pagediff --help for more information");
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_compare(
    original: &Path,
    modified: &Path,
    args: CompareArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(original));
    log::debug!(
        "Comparing {} with {} into {}",
        original.display(),
        modified.display(),
        output_dir.display()
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut builder = Pagediff::new().with_dpi(args.dpi).with_progress(tx);
    if args.sequential {
        builder = builder.sequential();
    }
    if let Some(fuzzy) = args.fuzzy {
        builder = builder.with_fuzzy(fuzzy);
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let (original_path, modified_path) = (original.to_path_buf(), modified.to_path_buf());
    let worker = thread::spawn(move || builder.compare_files(original_path, modified_path));

    // The channel closes when the worker drops its options.
    let mut counts = (0, 0);
    for event in rx.iter() {
        match event {
            Progress::Stage(stage) => {
                pb.set_position(0);
                if let Some(length) = stage_length(stage, counts) {
                    pb.set_length(length);
                }
                pb.set_message(format!("{}...", stage));
            }
            Progress::PageCounts { original, modified } => {
                counts = (original, modified);
                if let Some(length) = stage_length(Stage::Extract, counts) {
                    pb.set_length(length);
                }
            }
            Progress::PageExtracted { side, page, total }
            | Progress::PageRendered { side, page, total } => {
                pb.inc(1);
                pb.set_message(format!("{} page {}/{}", side, page + 1, total));
            }
            Progress::Finished(_) => pb.set_message("Writing pages..."),
        }
    }

    let result = worker
        .join()
        .map_err(|_| "comparison thread panicked")??;

    let written_dir = if args.timestamped {
        result.save_timestamped(&output_dir)?
    } else {
        result.save(&output_dir)?;
        output_dir
    };
    pb.finish_with_message("Done!");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary())?);
    } else {
        print_summary(&result, &written_dir);
    }
    Ok(())
}

/// Progress bar length for a page-level stage, covering both sides.
///
/// Extraction reads every page of both inputs; rendering runs after
/// pairing, so each side has as many pages as the longer input.
fn stage_length(stage: Stage, (original, modified): (usize, usize)) -> Option<u64> {
    match stage {
        Stage::Extract => Some((original + modified) as u64),
        Stage::Render => Some(original.max(modified) as u64 * 2),
        _ => None,
    }
}

/// `<original stem>_diff` in the working directory.
fn default_output_dir(original: &Path) -> PathBuf {
    let stem = original.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_diff", stem))
}

fn print_summary(result: &ComparisonResult, dir: &Path) {
    let changes = result.changes;
    println!();
    if result.is_identical() {
        println!("{}", "Documents are identical".green().bold());
    } else {
        println!("{}", "Changes".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}: {}", "Deletions".bold(), changes.deletions.to_string().red());
        println!("{}: {}", "Insertions".bold(), changes.insertions.to_string().green());
        println!(
            "{}: {}",
            "Modifications".bold(),
            changes.modifications.to_string().yellow()
        );
    }

    let diagnostics = &result.diagnostics;
    for failure in &diagnostics.substituted {
        println!(
            "{} {} page {} replaced by a blank page: {}",
            "Warning:".yellow().bold(),
            failure.side,
            failure.page + 1,
            failure.reason
        );
    }
    if !diagnostics.projection.gaps.is_empty() {
        println!(
            "{} {} changed words could not be located on the page ({} recognized tokens unmatched)",
            "Warning:".yellow().bold(),
            diagnostics.projection.gaps.len(),
            diagnostics.projection.unused_tokens
        );
    }

    println!("\n{} {}", "Output files:".green().bold(), dir.display());
    let pages = result.page_count();
    for side in Side::BOTH {
        let first = pagediff::render::page_file_name(side, 0);
        if pages > 1 {
            println!("  {} {} ... ({} pages)", "├─".dimmed(), first, pages);
        } else if pages == 1 {
            println!("  {} {}", "├─".dimmed(), first);
        }
    }
    println!("  {} {}", "└─".dimmed(), pagediff::render::SUMMARY_FILE);
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let registry = LoaderRegistry::with_defaults();
    let workspace = Workspace::new()?;
    let source = registry.load(input, &workspace, pagediff::pipeline::DEFAULT_DPI)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), source.page_count());

    let mut blocks = 0;
    let mut words = 0;
    let mut with_tokens = 0;
    for page in 0..source.page_count() {
        match source.extract_blocks(page) {
            Ok(found) => {
                blocks += found.len();
                words += found
                    .iter()
                    .map(|b| b.key.split_whitespace().count())
                    .sum::<usize>();
            }
            Err(e) => println!(
                "{} page {}: {}",
                "Warning:".yellow().bold(),
                page + 1,
                e
            ),
        }
        if source.detected_tokens(page).is_some() {
            with_tokens += 1;
        }
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Text blocks".bold(), blocks);
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Pages with tokens".bold(), with_tokens);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagediff".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Visual document comparison tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pagediff".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("docs/contract_v1.json")),
            PathBuf::from("contract_v1_diff")
        );
    }

    #[test]
    fn test_stage_length_covers_both_sides() {
        // Three pages against one: four reads, then three pairs rendered
        assert_eq!(stage_length(Stage::Extract, (3, 1)), Some(4));
        assert_eq!(stage_length(Stage::Render, (3, 1)), Some(6));
        assert_eq!(stage_length(Stage::Align, (3, 1)), None);
    }

    #[test]
    fn test_cli_parses_compare() {
        let cli = Cli::parse_from([
            "pagediff", "compare", "a.json", "b.json", "-o", "out", "--ocr", "--min-confidence",
            "75",
        ]);
        match cli.command {
            Some(Commands::Compare {
                output,
                ocr,
                min_confidence,
                dpi,
                ..
            }) => {
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(ocr);
                assert_eq!(min_confidence, 75.0);
                assert_eq!(dpi, 150.0);
            }
            _ => panic!("expected compare command"),
        }
    }

    #[test]
    fn test_compare_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in [("a", "Total 10"), ("b", "Total 12")] {
            pagediff::Page::blank(0, 40, 20)
                .bitmap
                .save(dir.path().join(format!("{}.png", name)))
                .unwrap();
            let manifest = serde_json::json!({
                "dpi": 72,
                "pages": [{
                    "image": format!("{}.png", name),
                    "blocks": [{
                        "text": text,
                        "bbox": { "x0": 2, "y0": 2, "x1": 30, "y1": 12 }
                    }]
                }]
            });
            fs::write(
                dir.path().join(format!("{}.json", name)),
                manifest.to_string(),
            )
            .unwrap();
        }

        let output = dir.path().join("out");
        cmd_compare(
            &dir.path().join("a.json"),
            &dir.path().join("b.json"),
            CompareArgs {
                output: Some(output.clone()),
                dpi: 72.0,
                ..CompareArgs::default()
            },
        )
        .unwrap();
        assert!(output.join("original_page_1.png").exists());
        assert!(output.join(pagediff::render::SUMMARY_FILE).exists());
    }
}
