//! # Bolt Bin CLI
//!
//! Terminal front end for configuring bolt bins.
//!
//! ```bash
//! bolt_cli new --pdf              # interactive setup, save JSON and a PDF
//! bolt_cli show bin_config.json   # print the grid of a saved bin
//! bolt_cli pdf bin_config.json    # export a saved bin to PDF
//! bolt_cli parse 1-1/2 0.375      # check how sizes are read and labelled
//! ```

mod wizard;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bolt_core::file_io::{self, export_pdf, load_layout, save_layout};
use bolt_core::fraction::{self, FormattedFraction};
use bolt_core::layout::BinLayoutModel;
use bolt_core::settings::Settings;

const DEFAULT_SETTINGS_FILE: &str = "bolt_bin.toml";

/// Bolt Bin - configure bolt bin layouts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configure a new bin interactively
    New {
        /// Where to save the configuration
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Also export a PDF report
        #[arg(long)]
        pdf: bool,
    },
    /// Print a saved configuration
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Export a saved configuration to PDF
    Pdf {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (defaults to a timestamped name in the output directory)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Parse sizes and show how they are labelled
    Parse {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    debug!(?settings, "settings loaded");

    match cli.command {
        Command::New { out, pdf } => run_new(&settings, out, pdf),
        Command::Show { file } => {
            let model = open(&file, &settings)?;
            print!("{}", wizard::describe(&model));
            Ok(())
        }
        Command::Pdf { file, out } => {
            let model = open(&file, &settings)?;
            let out = out.unwrap_or_else(|| pdf_path(&settings));
            write_pdf(&model, &out)
        }
        Command::Parse { values } => {
            for value in values {
                run_parse(&value, settings.max_denominator);
            }
            Ok(())
        }
    }
}

fn run_new(settings: &Settings, out: Option<PathBuf>, pdf: bool) -> Result<()> {
    let stdin = io::stdin();
    let model = wizard::Session::new(stdin.lock(), io::stdout()).run(settings)?;
    let Some(model) = model else {
        println!("Discarded.");
        return Ok(());
    };

    let out = out.unwrap_or_else(|| wizard::default_output(settings));
    save_layout(&model, &out).with_context(|| format!("Failed to save {}", out.display()))?;
    println!("Saved {}", out.display());

    if pdf {
        if model.is_empty() {
            println!("No rows configured, skipping PDF.");
        } else {
            write_pdf(&model, &pdf_path(settings))?;
        }
    }
    Ok(())
}

fn open(file: &Path, settings: &Settings) -> Result<BinLayoutModel> {
    let model = load_layout(file, settings.limits)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    Ok(model.with_max_denominator(settings.max_denominator))
}

fn pdf_path(settings: &Settings) -> PathBuf {
    settings
        .output_dir
        .join(file_io::timestamped_filename_now("bolt_bin", "pdf"))
}

fn write_pdf(model: &BinLayoutModel, out: &Path) -> Result<()> {
    export_pdf(model, out).with_context(|| format!("Failed to export {}", out.display()))?;
    println!("PDF saved to {}", out.display());
    Ok(())
}

fn run_parse(value: &str, max_denominator: u32) {
    match fraction::parse(value) {
        Ok(parsed) => match fraction::format_with_bound(parsed, max_denominator) {
            FormattedFraction::Exact(text) => println!("{} = {} -> {}", value, parsed.value(), text),
            FormattedFraction::Approximate(text) => {
                println!("{} = {} -> {} (approximate)", value, parsed.value(), text)
            }
        },
        Err(e) => eprintln!("{}: {}", value, e),
    }
}
