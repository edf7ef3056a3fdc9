use anyhow::{Context, Result};
use clap::Parser;
use partno_core::{MatchScope, ReconcileConfig};
use partno_ocr::{default_backend, LineParser, OrderPipeline};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ReconcileConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;

    match cli.command {
        Commands::Reconcile { catalog, input, threshold, name_only, full, pretty } => {
            let mut config = match threshold {
                Some(t) => config.with_threshold(t)?,
                None => config,
            };
            if name_only {
                config.scope = MatchScope::NameOnly;
            }
            tracing::debug!(threshold = config.threshold, scope = ?config.scope, "reconciling");

            let catalog = Arc::new(partno_match::load_or_empty(&catalog));
            let pipeline = OrderPipeline::new(default_backend(), catalog, &config);

            let result = match (input.text, input.image) {
                (Some(text), _) => pipeline.process_text(&read_text(&text)?),
                (None, Some(image)) => pipeline
                    .process_file(&image)
                    .await
                    .with_context(|| format!("Failed to process {}", image.display()))?,
                (None, None) => anyhow::bail!("either --text or --image is required"),
            };

            if full {
                print_json(&result, pretty)?;
            } else {
                print_json(&result.report, pretty)?;
            }
        }

        Commands::Parse { text, pretty } => {
            let items = LineParser::from_config(&config).parse(&read_text(&text)?);
            print_json(&items, pretty)?;
        }

        Commands::Catalog { catalog } => {
            let catalog = partno_match::load_catalog(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            for sheet in catalog.sheets() {
                println!("{}\t{} rows", sheet.name, sheet.rows.len());
            }
            println!("total\t{} rows in {} sheets", catalog.row_count(), catalog.sheet_count());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
