use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use photo_tidy_core::logging::{init_logger, LOG_ENV_VAR};
use photo_tidy_core::{Config, DuplicateReport, LogLevel, PhotoTidy, RenamePlan};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "photo-tidy")]
#[command(about = "Find duplicate photos, merge folders without name clashes and convert HEIC to JPEG")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to rotating files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report pixel-identical images in a directory, or images in OTHER that duplicate DIR
    Duplicates {
        /// Directory to scan
        dir: PathBuf,

        /// Second directory to compare against DIR
        other: Option<PathBuf>,

        /// Print the duplicate classes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename files in DIR_B whose names also appear in DIR_A
    Rename {
        /// Directory whose names are kept
        dir_a: PathBuf,

        /// Directory whose clashing files are renamed
        dir_b: PathBuf,

        /// Apply the renames without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Copy a directory with every HEIC/HEIF file converted to JPEG
    Convert {
        /// Directory to convert
        dir: PathBuf,

        /// Name of the new sibling directory (default: <DIR>_all_jpgs)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "photo-tidy.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up configuration
    let mut config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::default(),
    };

    // Set log level based on verbosity
    config.log_level = match cli.verbose {
        0 => config.log_level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(cli.log_dir.as_deref(), config.log_level.into())?;

    let tidy = PhotoTidy::new(config)?;
    install_shutdown_handler(&tidy)?;

    match cli.command {
        Commands::Duplicates { dir, other, json } => {
            let spinner = spinner("Scanning for duplicate images...");
            let report = match &other {
                Some(other) => tidy.find_duplicates_between(&dir, other),
                None => tidy.find_duplicates(&dir),
            };
            spinner.finish_and_clear();
            let report = report?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.summary())?);
            } else {
                print_report(&report, other.is_some());
            }
        }

        Commands::Rename { dir_a, dir_b, yes } => {
            let plan = tidy.plan_merge(&dir_a, &dir_b)?;
            if plan.is_empty() {
                println!("Nothing to do: no file name appears in both directories");
                return Ok(());
            }

            print_plan(&dir_b, &plan);
            if !yes && !confirm(&format!("Rename {} files in {}?", plan.len(), dir_b.display()))? {
                println!("No files renamed");
                return Ok(());
            }

            let applied = tidy.apply_plan(&dir_b, &plan)?;
            println!("Renamed {} files", applied);
        }

        Commands::Convert { dir, output } => {
            let spinner = spinner("Converting HEIC files...");
            let summary = tidy.convert_directory(&dir, output.as_deref());
            spinner.finish_and_clear();
            let summary = summary?;

            println!("Created {}", summary.destination.display());
            println!("  HEIC/HEIF converted:  {}", summary.converted);
            println!("  Conversion failures:  {}", summary.failed);
            println!("  Files copied:         {}", summary.copied_files);
            println!("  Directories copied:   {}", summary.copied_directories);
        }

        Commands::GenerateConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
        }
    }

    info!("Done");
    Ok(())
}

fn init_logging(log_dir: Option<&Path>, level: LevelFilter) -> anyhow::Result<()> {
    match log_dir {
        Some(dir) => init_logger(dir, level)
            .map_err(|e| anyhow::anyhow!("Failed to initialise file logging in {}: {}", dir.display(), e)),
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_env(LOG_ENV_VAR)
                .init();
            Ok(())
        }
    }
}

fn install_shutdown_handler(tidy: &PhotoTidy) -> anyhow::Result<()> {
    let shutdown = tidy.shutdown_handle();
    ctrlc::set_handler(move || {
        if shutdown.swap(true, Ordering::SeqCst) {
            // Second Ctrl+C - force exit
            eprintln!("\nForce shutdown requested. Exiting immediately...");
            std::process::exit(130);
        }
        eprintln!("\nShutdown requested. Finishing current file... (Press Ctrl+C again to force quit)");
    })
    .context("Failed to set Ctrl+C handler")
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn print_report(report: &DuplicateReport, two_directories: bool) {
    if report.is_clean() {
        println!("No duplicates found among {} images", report.image_count());
        return;
    }

    for class in report.with_duplicates() {
        println!("{}", class.representative.path().display());
        for path in class.similar_paths() {
            println!("  = {}", path.display());
        }
    }

    if two_directories {
        println!("{} images duplicate an image in the first directory", report.duplicate_count());
    } else {
        println!(
            "{} duplicates in {} classes ({} images scanned)",
            report.duplicate_count(),
            report.with_duplicates().count(),
            report.image_count()
        );
    }
}

fn print_plan(dir_b: &Path, plan: &RenamePlan) {
    for rename in plan.iter() {
        println!(
            "{} -> {}",
            dir_b.join(&rename.old_name).display(),
            dir_b.join(&rename.new_name).display()
        );
    }
}
