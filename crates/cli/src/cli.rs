use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "partno")]
#[command(about = "Reconcile OCR'd purchase-order lines against a parts catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML config (threshold, catalog columns, noise words, substitutions)
    #[arg(short, long, global = true, env = "PARTNO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a purchase order and match every line against the catalog
    Reconcile {
        /// Catalog workbook (.xlsx/.xls/.ods), CSV or JSON snapshot
        #[arg(long)]
        catalog: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        /// Minimum similarity in 0.0..=1.0, overrides the config file
        #[arg(long, env = "PARTNO_THRESHOLD")]
        threshold: Option<f64>,

        /// Compare item names with the catalog name column only
        #[arg(long)]
        name_only: bool,

        /// Include OCR text and parsed items in the output
        #[arg(long)]
        full: bool,

        #[arg(long)]
        pretty: bool,
    },

    /// Show how OCR text splits into items, without matching
    Parse {
        /// OCR text file, `-` for stdin
        #[arg(long)]
        text: PathBuf,

        #[arg(long)]
        pretty: bool,
    },

    /// Summarize a catalog: sheets and row counts
    Catalog {
        #[arg(long)]
        catalog: PathBuf,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// OCR text file, `-` for stdin
    #[arg(long)]
    pub text: Option<PathBuf>,

    /// Purchase-order image (requires the `tesseract` feature)
    #[arg(long)]
    pub image: Option<PathBuf>,
}
