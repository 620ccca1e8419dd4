use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod enrich;
mod records;
mod report;
mod resolve;
mod tree;
mod util;

use cli::RootArgs;
use config::{resolve_config, ConfigOverrides};
use enrich::{run_enrich, EnrichPaths};
use report::{write_report, EnrichReport};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let overrides = ConfigOverrides {
        content_field: args.content_field,
    };
    let config = resolve_config(args.config.as_deref(), &overrides)?;
    let paths = EnrichPaths {
        tree: args.tree,
        records_dir: args.law_jsons,
        output: args.output,
    };

    let summary = run_enrich(&paths, &config)?;
    tracing::info!(
        leaves = summary.leaves,
        exact = summary.exact,
        merged = summary.merged,
        empty = summary.empty,
        missing = summary.missing,
        record_files = summary.record_files_loaded,
        "enrichment complete"
    );

    if let Some(report_path) = &args.report {
        write_report(report_path, &EnrichReport::new(&paths, &config, &summary))?;
    }
    println!("Wrote enriched tree to {}", paths.output.display());
    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `-v` picks the level.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
