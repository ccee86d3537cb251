//! Convert command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use qbridge_core::Config;

use super::common::{build_converter, load_program, write_output};

/// Execute the convert command.
pub fn execute(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
    from: Option<&str>,
    targets: &[String],
) -> Result<()> {
    let converter = build_converter(config)?;
    let program = load_program(input, from)?;
    let source = program.node();

    info!("Loaded {} as {}", input.display(), source);

    let converted = match targets {
        [target] => converter.convert(&program, source, target),
        _ => converter.convert_to_best(&program, source, targets),
    }
    .with_context(|| format!("Failed to convert {}", input.display()))?;

    for failure in &converted.failed_attempts {
        eprintln!("{} {}", style("Skipped:").yellow().bold(), failure);
    }

    let text = converted.program.to_text()?;
    write_output(&text, output)?;

    eprintln!(
        "{} {} -> {} via {} (cost {:.4})",
        style("Converted").green().bold(),
        source,
        converted.node,
        converted.path,
        converted.path.cost()
    );
    if let Some(path) = output {
        eprintln!("  Output: {}", path.display());
    }

    Ok(())
}
