use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use logtally::cli::{extract_config_file_arg, Cli};
use logtally::config_file::{find_config_path, ConfigFile};
use logtally::formatters::create_formatter;
use logtally::logging::init_logging;
use logtally::{run_analysis, AnalyzerConfig};

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
}

impl ExitCode {
    fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = process_args_with_config(raw_args);

    let cli = Cli::parse_from(args);

    if !cli.alias.is_empty() {
        eprintln!(
            "logtally: Error: alias '{}' cannot be expanded without a configuration file",
            cli.alias[0]
        );
        ExitCode::InvalidUsage.exit();
    }

    init_logging(cli.verbose, cli.quiet);

    let config = match AnalyzerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("logtally: Error: {}", e);
            ExitCode::InvalidUsage.exit();
        }
    };

    let code = match run(&config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("logtally: Error: {:#}", e);
            ExitCode::GeneralError
        }
    };
    code.exit();
}

/// Analyze, render and write. A source failure still writes an error document.
fn run(config: &AnalyzerConfig) -> Result<ExitCode> {
    let formatter = create_formatter(config.output.format);
    let destination = config.output.file.as_deref();

    match run_analysis(config) {
        Ok(run) => {
            write_output(destination, &formatter.render(&run.report))?;
            if config.output.stats {
                eprintln!("{}", run.stats.format_stats());
            }
            Ok(ExitCode::Success)
        }
        Err(e) => {
            tracing::error!(locator = %config.input.locator, error = %e, "cannot read input");
            write_output(destination, &formatter.render_error(&e.to_string()))?;
            eprintln!("logtally: Error: {}", e);
            Ok(ExitCode::GeneralError)
        }
    }
}

fn write_output(destination: Option<&Path>, text: &str) -> Result<()> {
    match destination {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            match lock.write_all(text.as_bytes()).and_then(|_| lock.flush()) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other.context("Failed to write report to stdout"),
            }
        }
    }
}

/// Handle `--show-config`, then apply config file defaults and aliases.
fn process_args_with_config(raw_args: Vec<String>) -> Vec<String> {
    let config_file_path = extract_config_file_arg(&raw_args).map(PathBuf::from);

    if raw_args.iter().any(|arg| arg == "--show-config") {
        let loaded_from = config_file_path.clone().or_else(find_config_path);
        match ConfigFile::load(config_file_path.as_deref()) {
            Ok(config_file) => {
                print!("{}", config_file.describe(loaded_from.as_deref()));
                ExitCode::Success.exit();
            }
            Err(e) => {
                eprintln!("logtally: Config file error: {:#}", e);
                ExitCode::InvalidUsage.exit();
            }
        }
    }

    if raw_args.iter().any(|arg| arg == "--ignore-config") {
        return raw_args;
    }

    let expanded = ConfigFile::load(config_file_path.as_deref())
        .and_then(|config_file| config_file.expand_args(raw_args));
    match expanded {
        Ok(args) => args,
        Err(e) => {
            eprintln!("logtally: Config error: {:#}", e);
            ExitCode::InvalidUsage.exit();
        }
    }
}
