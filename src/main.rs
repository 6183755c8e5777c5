use storage_layout::ast::{load_paths, ContractResolver};
use storage_layout::cli::Cli;
use storage_layout::output;
use storage_layout::{LayoutConfig, LayoutReport, LayoutSession, SolidityTypeSizer};

use clap::Parser;

/// Main entry point for the layout tool
fn main() -> eyre::Result<()> {
    // Initialize tracing (RUST_LOG controls verbosity)
    reth_tracing::init_test_tracing();

    let cli = Cli::parse();

    // Config file first, then CLI overrides
    let mut config = match &cli.config {
        Some(path) => LayoutConfig::from_file(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(alignment) = cli.struct_alignment {
        config = config.with_struct_alignment(alignment);
    }

    let contracts = load_paths(&cli.paths, &SolidityTypeSizer)?;
    if contracts.is_empty() {
        eyre::bail!("no contracts found in {:?}", cli.paths);
    }

    let names: Vec<String> = match &cli.contract {
        Some(name) if !contracts.contains(name) => {
            eyre::bail!("contract {name} not found in the loaded artifacts")
        }
        Some(name) => vec![name.clone()],
        None => contracts.names().map(str::to_string).collect(),
    };

    let mut session = LayoutSession::new(contracts, config);
    if !cli.json {
        output::print_loaded(session.contracts().len(), session.table().len());
    }

    let mut reports = Vec::with_capacity(names.len());
    for name in &names {
        let layout = session.layout(name)?;
        let report = LayoutReport::new(name, &layout, session.config().struct_alignment);
        if cli.json {
            reports.push(report);
            continue;
        }
        match session.contracts().contract_node(name) {
            Some(contract) => output::print_layout(&report, &contract.linearized_base_contracts),
            None => {
                output::print_layout(&report, &[]);
                output::print_warning(&format!("{name} has no AST in its artifact"));
            }
        }
    }

    if cli.json {
        let json = match reports.as_slice() {
            [single] if cli.contract.is_some() => serde_json::to_string_pretty(single)?,
            _ => serde_json::to_string_pretty(&reports)?,
        };
        println!("{json}");
    }

    Ok(())
}
