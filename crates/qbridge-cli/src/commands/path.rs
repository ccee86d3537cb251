//! Path command implementation.

use anyhow::Result;
use console::style;

use qbridge_core::{Config, ConversionPath, SearchLimits};
use qbridge_formats::QuantumProgram;

use super::common::build_converter;

/// Bound on path length when listing every path without `--max-hops`.
const DEFAULT_LIST_HOPS: usize = 4;

/// Execute the path command.
pub fn execute(config: &Config, from: &str, to: &str, all: bool, max_hops: Option<usize>) -> Result<()> {
    let converter = build_converter(config)?;
    let graph = converter.graph();

    if all {
        let paths = graph.all_paths(from, to, max_hops.unwrap_or(DEFAULT_LIST_HOPS))?;
        println!(
            "{} {} path(s) from {} to {}:\n",
            style("qbridge").cyan().bold(),
            paths.len(),
            style(from).bold(),
            style(to).bold()
        );
        for (i, path) in paths.iter().enumerate() {
            println!("  {}. {}  (cost {:.4})", i + 1, path, path.cost());
        }
        return Ok(());
    }

    let limits = SearchLimits::new().with_max_hops(max_hops);
    let path = graph.shortest_path_with(from, to, &limits)?;
    print_path(&path);
    Ok(())
}

fn print_path(path: &ConversionPath<QuantumProgram>) {
    println!("{} {}", style("Path:").green().bold(), path);
    println!("  Cost: {:.4}", path.cost());
    println!("  Hops: {}", path.hops());
    if path.is_identity() {
        return;
    }
    println!("  Steps:");
    for (i, step) in path.steps().iter().enumerate() {
        println!(
            "    {}. {} (weight {:.3}{})",
            i + 1,
            step.edge.name(),
            step.edge.weight(),
            if step.edge.is_native() { "" } else { ", fallback" }
        );
    }
}
