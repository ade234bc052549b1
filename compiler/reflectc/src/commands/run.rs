//! The `box` command: expand a file and evaluate its `box()` entry point.

use reflect_eval::Interpreter;

use crate::config::PluginConfig;

use super::{read_file, report_diagnostics, Expansion};

/// Print what `box()` returns. With `trace`, interceptor events go to
/// stderr first.
pub fn run_box_file(path: &str, config: &PluginConfig, trace: bool) {
    let source = read_file(path);
    let expansion = Expansion::new(path, &source, config);

    let errors = report_diagnostics(path, &source, expansion.diagnostics(), &config.diagnostics);
    if errors > 0 {
        std::process::exit(1);
    }

    let mut interpreter = Interpreter::new(&expansion.unit, &expansion.interner);
    let result = interpreter.run_box();
    for line in interpreter.output() {
        println!("{line}");
    }
    if trace {
        for event in interpreter.trace() {
            eprintln!("trace: {event}");
        }
    }

    match result {
        Ok(value) => println!("{value}"),
        Err(err) => {
            report_diagnostics(path, &source, vec![err.to_diagnostic()], &config.diagnostics);
            std::process::exit(1);
        }
    }
}
