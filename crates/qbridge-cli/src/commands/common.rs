//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use qbridge_core::{Config, Converter, RankedNode};
use qbridge_formats::{QuantumProgram, builtin_registry};

/// Build a converter over the built-in formats, shaped by `config`.
pub fn build_converter(config: &Config) -> Result<Converter<QuantumProgram>> {
    let registry = builtin_registry().context("Failed to register built-in conversions")?;
    let converter = Converter::from_registry(&registry, &config.graph_options())
        .context("Failed to build conversion graph")?
        .with_scheme(config.scheme())?;
    Ok(converter)
}

/// Load a program file, detecting its node from the contents unless given.
pub fn load_program(path: &Path, node: Option<&str>) -> Result<QuantumProgram> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let node = match node {
        Some(node) => node,
        None => QuantumProgram::detect(&source).with_context(|| {
            format!(
                "Cannot detect the format of {}; pass --from",
                path.display()
            )
        })?,
    };

    QuantumProgram::from_text(node, &source)
        .with_context(|| format!("Failed to load {} as {node}", path.display()))
}

/// Write `text` to `output`, or to stdout.
pub fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write file: {}", path.display())),
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Print a ranking table.
pub fn print_ranking(ranked: &[RankedNode]) {
    let width = ranked.iter().map(|r| r.node.len()).max().unwrap_or(4).max(4);
    println!("  {:<width$}  {:>8}  {:>4}", "NODE", "COST", "HOPS");
    for entry in ranked {
        println!("  {:<width$}  {:>8.4}  {:>4}", entry.node, entry.cost, entry.hops);
    }
}
