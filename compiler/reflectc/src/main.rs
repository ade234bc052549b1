//! reflectc CLI
//!
//! Runs the arrow-reflect synthesis passes over Kotlin fixture sources.

use reflectc::commands::{
    check_file, expand_file, explain_error, run_box_file, run_fixture_suite, FixtureSuiteOptions,
};
use reflectc::{init_tracing, PluginConfig};

const DEFAULT_FIXTURE_DIR: &str = "compiler/reflectc/tests/fixtures";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    // Plugin flags and `--tree` are accepted anywhere after the command.
    let mut config = PluginConfig::default();
    let mut tree = false;
    let mut rest = Vec::new();
    for arg in &args[2..] {
        match config.apply_flag(arg) {
            Ok(true) => {}
            Ok(false) if arg == "--tree" => tree = true,
            Ok(false) => rest.push(arg.as_str()),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }
    init_tracing(tree);

    let command = &args[1];
    match command.as_str() {
        "expand" => {
            let Some(path) = positional(&rest) else {
                eprintln!("Usage: reflectc expand <file.kt> [options]");
                std::process::exit(1);
            };
            expand_file(path, &config);
        }
        "check" => {
            let Some(path) = positional(&rest) else {
                eprintln!("Usage: reflectc check <file.kt> [options]");
                std::process::exit(1);
            };
            check_file(path, &config);
        }
        "box" => {
            let Some(path) = positional(&rest) else {
                eprintln!("Usage: reflectc box <file.kt> [--trace] [options]");
                std::process::exit(1);
            };
            let trace = rest.contains(&"--trace");
            run_box_file(path, &config, trace);
        }
        "fixtures" => {
            let mut options = FixtureSuiteOptions::default();
            for arg in &rest {
                if let Some(filter) = arg.strip_prefix("--filter=") {
                    options.filter = Some(filter.to_string());
                } else if *arg == "--verbose" || *arg == "-v" {
                    options.verbose = true;
                }
            }
            let path = positional(&rest).unwrap_or(DEFAULT_FIXTURE_DIR);
            run_fixture_suite(path, &config, &options);
        }
        "--explain" | "explain" => {
            let Some(code) = positional(&rest) else {
                eprintln!("Usage: reflectc explain <ERROR_CODE>");
                eprintln!("Example: reflectc explain E2001");
                std::process::exit(1);
            };
            explain_error(code);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("reflectc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // A bare `.kt` path expands it.
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("kt"))
            {
                expand_file(command, &config);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn positional<'a>(args: &[&'a str]) -> Option<&'a str> {
    args.iter().copied().find(|arg| !arg.starts_with('-'))
}

fn print_usage() {
    println!("reflectc: compile-time reflection, optics, samples and decorators");
    println!();
    println!("Usage: reflectc <command> [options]");
    println!();
    println!("Commands:");
    println!("  expand <file.kt>     Print the declarations synthesized for a file");
    println!("  check <file.kt>      Run the pass and report diagnostics only");
    println!("  box <file.kt>        Expand a file and print what box() returns");
    println!("  fixtures [path]      Run every *_test.kt fixture under path");
    println!("  explain <code>       Explain a diagnostic code (e.g., E2001)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Plugin options:");
    println!("  --decorators=<order> first-outermost (default) or last-outermost");
    println!("  --singleton=<policy> degrade (default) or keep one-variant hierarchies");
    println!("  --max-suffix=<n>     Highest numeric suffix tried for generated names");
    println!("  --max-depth=<n>      Nesting limit for shape classification");
    println!("  --error-limit=<n>    Stop reporting after n errors (0 = unlimited)");
    println!("  --tree               Render RUST_LOG output as a span tree");
    println!();
    println!("Box options:");
    println!("  --trace              Print interceptor events to stderr");
    println!();
    println!("Fixture options:");
    println!("  --filter=<pattern>   Only run fixtures whose path contains pattern");
    println!("  --verbose, -v        Print what each fixture synthesized");
    println!();
    println!("Examples:");
    println!("  reflectc expand point.kt");
    println!("  reflectc box decorator_test.kt --trace");
    println!("  reflectc fixtures --filter=optics");
    println!("  RUST_LOG=reflectc=debug reflectc check point.kt --tree");
}
