//! CLI argument parsing for the leaf enrichment run.
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "lawtree",
    version,
    about = "Annotate leaf categories of a law category tree with record content",
    after_help = "Examples:\n  lawtree --tree listTreeLawWebCategoryByParam-response.json --law-jsons law_jsons --output output.json\n  lawtree --tree tree.json --law-jsons law_jsons --output out.json --report report.json -v"
)]
pub struct RootArgs {
    /// Category tree JSON: a node array, or an object holding it under `data`
    #[arg(long, value_name = "PATH")]
    pub tree: PathBuf,

    /// Directory of per-id record files (`<id>.json`)
    #[arg(
        long = "law-jsons",
        visible_alias = "records",
        alias = "law_jsons",
        value_name = "DIR"
    )]
    pub law_jsons: PathBuf,

    /// Output path for the enriched tree
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Optional enrichment config JSON
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Field read from records and written onto leaves (overrides config)
    #[arg(long, value_name = "NAME")]
    pub content_field: Option<String>,

    /// Write a machine-readable run report
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
