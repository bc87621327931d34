//! list-highlights CLI - list highlighted text of PDF documents

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_highlights::{
    ErrorMode, ExtractOptions, HighlightExtractor, OutputFormat, RunSummary, ScaleFactors,
};

/// Exit code when lenient mode skipped at least one input.
const EXIT_PARTIAL: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "list-highlights")]
#[command(version)]
#[command(about = "List the text under highlight annotations of PDF files", long_about = None)]
struct Cli {
    /// Input PDF files, processed in order
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Width factor applied to each highlight rectangle about its centre
    #[arg(long, value_name = "FACTOR", default_value = "1.0", value_parser = parse_scale)]
    scale_w: f64,

    /// Height factor applied to each highlight rectangle about its centre
    #[arg(long, value_name = "FACTOR", default_value = "1.0", value_parser = parse_scale)]
    scale_h: f64,

    /// Write viz_<name> copies with the read rectangles outlined
    #[arg(long)]
    vis: bool,

    /// Skip inputs that cannot be processed instead of stopping
    #[arg(long, env = "LIST_HIGHLIGHTS_KEEP_GOING")]
    keep_going: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: Format,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Filename,Page_num,Highlighted_text rows with a header
    Csv,
    /// One JSON object per line
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => OutputFormat::Csv,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn parse_scale(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("'{s}' must be a finite number greater than zero"));
    }
    Ok(value)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => {
            for path in &summary.visualizations {
                eprintln!("{} {}", "Saved".green(), path.display());
            }
            if summary.has_failures() {
                for (path, e) in &summary.failures {
                    eprintln!("{} {}: {}", "Skipped".yellow(), path.display(), e);
                }
                process::exit(EXIT_PARTIAL);
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            process::exit(1);
        }
    }
}

impl Cli {
    fn extract_options(&self) -> pdf_highlights::Result<ExtractOptions> {
        let error_mode = if self.keep_going {
            ErrorMode::Lenient
        } else {
            ErrorMode::Strict
        };
        Ok(ExtractOptions::new()
            .with_scale(ScaleFactors::new(self.scale_w, self.scale_h)?)
            .with_visualize(self.vis)
            .with_error_mode(error_mode))
    }
}

fn run(cli: &Cli) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let extractor = HighlightExtractor::new(cli.extract_options()?);

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = OutputFormat::from(cli.format).sink(writer)?;

    let pb = if cli.progress {
        let pb = ProgressBar::new(cli.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let summary = extractor.run_with_progress(&cli.inputs, &mut sink, |path| {
        if let Some(pb) = &pb {
            pb.set_message(path.display().to_string());
            pb.inc(1);
        }
    })?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(summary)
}
