//! The `expand` command: print what the pass synthesizes for a file.

use crate::config::PluginConfig;

use super::{read_file, report_diagnostics, Expansion};

/// Run one pass over `path` and print each synthesized declaration.
pub fn expand_file(path: &str, config: &PluginConfig) {
    let source = read_file(path);
    let expansion = Expansion::new(path, &source, config);

    for (header, rendered) in expansion.rendered() {
        println!("{header}");
        println!("{rendered}");
        println!();
    }

    let errors = report_diagnostics(path, &source, expansion.diagnostics(), &config.diagnostics);
    if errors > 0 {
        std::process::exit(1);
    }
}
