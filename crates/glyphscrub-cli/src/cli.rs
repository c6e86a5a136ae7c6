use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use glyphscrub::MAX_SCALE;

/// Find names in scanned images with OCR and paint them over.
#[derive(Debug, Parser)]
#[command(name = "glyphscrub", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Redact names and extra terms from images
    Redact {
        /// Image files to process
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Name map: 'orig1=repl1,orig2=repl2'. Case variants are added automatically
        #[arg(short, long)]
        map: Option<String>,

        /// File with one 'old=new' pair per line ('#' starts a comment)
        #[arg(long, value_name = "PATH")]
        map_file: Option<PathBuf>,

        /// Comma-separated strings to black out with no replacement label
        #[arg(long, value_name = "LIST")]
        extra_redact: Option<String>,

        /// Directory for output files. Default: next to each input
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// OCR upscale factor, up to 8 (default: 2.0)
        #[arg(long, default_value_t = 2.0, value_parser = parse_scale)]
        scale: f64,

        /// Skip images whose width or height is below this many pixels
        #[arg(long, value_name = "N", default_value_t = 0)]
        min_size: u32,

        /// Replay a saved Tesseract TSV instead of running OCR (single input only)
        #[arg(long, value_name = "TSV")]
        tokens: Option<PathBuf>,

        /// Output format for the report
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Run OCR on an image and print the recognized tokens
    Tokens {
        /// Path to the image file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// OCR upscale factor, up to 8 (default: 2.0)
        #[arg(long, default_value_t = 2.0, value_parser = parse_scale)]
        scale: f64,

        /// Output format
        #[arg(long, value_enum, default_value_t = TokenFormat::Text)]
        format: TokenFormat,
    },

    /// Print the expanded name variants and extra terms
    Terms {
        /// Name map: 'orig1=repl1,orig2=repl2'
        #[arg(short, long)]
        map: Option<String>,

        /// File with one 'old=new' pair per line ('#' starts a comment)
        #[arg(long, value_name = "PATH")]
        map_file: Option<PathBuf>,

        /// Comma-separated strings to black out with no replacement label
        #[arg(long, value_name = "LIST")]
        extra_redact: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

/// Parse an OCR upscale factor in `(0, MAX_SCALE]`.
fn parse_scale(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value.is_finite() && value > 0.0 && value <= MAX_SCALE {
        Ok(value)
    } else {
        Err(format!("scale must be greater than 0 and at most {MAX_SCALE}"))
    }
}

/// Output format for reports.
#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text
    Text,
    /// JSON
    Json,
}

/// Output format for token dumps.
#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    /// Tab-separated human-readable text
    Text,
    /// JSON array
    Json,
    /// CSV with header
    Csv,
    /// Tesseract TSV, readable by `redact --tokens`
    Tsv,
}
