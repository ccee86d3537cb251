//! Version command implementation.

use console::style;
use qbridge_formats::NODES;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - conversion paths between quantum program formats",
        style("qbridge").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qbridge-core     Conversion graph, path search and fallback execution");
    println!("  qbridge-formats  Built-in formats: {}", NODES.join(", "));
    println!("  qbridge-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
