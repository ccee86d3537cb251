//! Edges command implementation.

use anyhow::Result;
use console::style;

use qbridge_core::Config;

use super::common::build_converter;

/// Execute the edges command.
pub fn execute(config: &Config) -> Result<()> {
    let converter = build_converter(config)?;
    let graph = converter.graph();

    println!(
        "{} {} conversions ({} native):\n",
        style("qbridge").cyan().bold(),
        graph.edge_count(),
        graph.native_edge_count()
    );

    let mut edges: Vec<_> = graph.edges().map(|(_, edge)| edge).collect();
    edges.sort_by(|a, b| a.source().cmp(b.source()).then_with(|| a.target().cmp(b.target())));

    for edge in edges {
        println!(
            "  {:<24} {}  weight {:.3}{}",
            edge.name(),
            edge,
            edge.weight(),
            if edge.is_native() { "" } else { "  (fallback)" }
        );
    }

    Ok(())
}
