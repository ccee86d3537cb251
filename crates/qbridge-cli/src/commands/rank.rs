//! Targets and sources command implementations.

use anyhow::Result;
use console::style;

use qbridge_core::Config;

use super::common::{build_converter, print_ranking};

/// Execute the targets command.
pub fn execute_targets(config: &Config, from: &str, candidates: &[String], k: Option<usize>) -> Result<()> {
    let converter = build_converter(config)?;
    let graph = converter.graph();

    let ranked = if candidates.is_empty() {
        let all = graph.nodes();
        graph.top_targets(from, &all, k)?
    } else {
        graph.top_targets(from, candidates, k)?
    };

    if ranked.is_empty() {
        println!("No candidate is reachable from {}", style(from).bold());
        return Ok(());
    }
    println!("{} Reachable from {}:\n", style("qbridge").cyan().bold(), style(from).bold());
    print_ranking(&ranked);
    Ok(())
}

/// Execute the sources command.
pub fn execute_sources(config: &Config, to: &str, candidates: &[String], k: Option<usize>) -> Result<()> {
    let converter = build_converter(config)?;
    let graph = converter.graph();

    let ranked = if candidates.is_empty() {
        let all = graph.nodes();
        graph.top_sources(to, &all, k)?
    } else {
        graph.top_sources(to, candidates, k)?
    };

    if ranked.is_empty() {
        println!("No candidate can be converted to {}", style(to).bold());
        return Ok(());
    }
    println!("{} Convertible to {}:\n", style("qbridge").cyan().bold(), style(to).bold());
    print_ranking(&ranked);
    Ok(())
}
