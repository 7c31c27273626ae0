//! Binary entry point for robotpy-wrapper.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use robotpy_wrapper::cli::output::format_error;
use robotpy_wrapper::cli::parser::{build_command, parse_from};
use robotpy_wrapper::cli::{CommandTable, OutputFormat, Reporter, execute};
use robotpy_wrapper::{Workspace, logging};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or("robotpy")
        .to_string();

    let loaded = std::env::current_dir()
        .ok()
        .and_then(|cwd| Workspace::discover(&cwd));
    let table = loaded
        .as_ref()
        .map(|workspace| CommandTable::from_config(workspace.config()))
        .unwrap_or_default();

    if args.len() <= 1 {
        let help = build_command(&table).render_help();
        eprintln!("{help}");
        return ExitCode::FAILURE;
    }

    let cli = match parse_from(&table, &args) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let verbosity = cli.verbosity();
    logging::init(verbosity);
    let reporter = Reporter::new(program, verbosity);

    match execute(&cli, &table, loaded, &reporter) {
        Ok(output) => {
            if !output.is_empty() {
                // Handle broken pipe gracefully (e.g., when piped to `head` or `jq`)
                if let Err(e) = write!(io::stdout(), "{output}")
                    && e.kind() != io::ErrorKind::BrokenPipe
                {
                    reporter.fatal(format!("writing to stdout failed: {e}"));
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            reporter.fatal(format_error(&e, OutputFormat::parse(&cli.format)));
            ExitCode::FAILURE
        }
    }
}
