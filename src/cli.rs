use crate::config::StructAlignment;
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the layout tool
#[derive(Parser, Debug)]
#[command(
    name = "storage-layout",
    about = "Compute contract storage slot layouts from compiler artifacts"
)]
pub struct Cli {
    /// Artifact files or directories of `*.json` artifacts.
    ///
    /// Accepts contract artifacts with an `ast` field, raw `SourceUnit` ASTs,
    /// and standard JSON compiler output.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Contract to lay out. Every loaded contract is printed when omitted.
    #[arg(long, short)]
    pub contract: Option<String>,

    /// Print the layout as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// JSON layout config file (`{ "structAlignment": "continue" }`)
    #[arg(long, env = "STORAGE_LAYOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where struct members start; overrides the config file
    #[arg(long, value_enum)]
    pub struct_alignment: Option<StructAlignment>,
}
