//! The `check` command: run the pass and report diagnostics only.

use crate::config::PluginConfig;

use super::{read_file, report_diagnostics, Expansion};

pub fn check_file(path: &str, config: &PluginConfig) {
    let source = read_file(path);
    let expansion = Expansion::new(path, &source, config);

    let errors = report_diagnostics(path, &source, expansion.diagnostics(), &config.diagnostics);
    if errors > 0 {
        std::process::exit(1);
    }

    let count = expansion.output.map_or(0, |output| output.synthesized.len());
    println!("OK: {path} ({count} declarations synthesized)");
}
