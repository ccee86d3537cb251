//! Nodes command implementation.

use anyhow::Result;
use console::style;

use qbridge_core::Config;

use super::common::build_converter;

/// Execute the nodes command.
pub fn execute(config: &Config) -> Result<()> {
    let converter = build_converter(config)?;
    let graph = converter.graph();

    println!(
        "{} {} nodes:\n",
        style("qbridge").cyan().bold(),
        graph.node_count()
    );

    for name in graph.nodes() {
        let outgoing = graph.edges().filter(|(_, e)| e.source() == name).count();
        let incoming = graph.edges().filter(|(_, e)| e.target() == name).count();
        let kind = graph
            .experiment_type(name)
            .map_or_else(|| "unclassified".to_string(), |t| t.to_string());

        println!("  {} {}", style("●").green(), style(name).bold());
        println!("    Type: {kind}");
        println!("    Edges: {outgoing} out, {incoming} in");
    }

    Ok(())
}
