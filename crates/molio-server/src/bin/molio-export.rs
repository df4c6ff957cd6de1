//! Writes a freshly generated Molio archive to a file or stdout.
//!
//! ```text
//! molio-export [--config PATH] [OUTPUT]
//! molio-export > output.db.gz
//! ```
//!
//! Configuration is read from `--config`, then `MOLIO_CONFIG_PATH`, then
//! `config.toml`. `OUTPUT` defaults to stdout (also selected by `-`).
//! The archive is built completely in memory first, so a failed build
//! writes nothing and exits non-zero.

use molio_server::{config, init_tracing, output};
use std::io::Write;
use std::process::ExitCode;

const USAGE: &str = "usage: molio-export [--config PATH] [OUTPUT]";

#[derive(Debug, Default)]
struct ExportArgs {
    config: Option<String>,
    output: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<ExportArgs, String> {
    let mut parsed = ExportArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            let path = args
                .next()
                .ok_or_else(|| format!("{arg} needs a path"))?;
            parsed.config = Some(path);
        } else if let Some(path) = arg.strip_prefix("--config=") {
            parsed.config = Some(path.to_string());
        } else if arg.starts_with('-') && arg != "-" {
            return Err(format!("unknown option {arg}"));
        } else if parsed.output.is_some() {
            return Err(format!("unexpected argument {arg}"));
        } else {
            parsed.output = Some(arg).filter(|target| target != "-");
        }
    }

    Ok(parsed)
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("molio-export: {e}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let (config_path, config_source) =
        config::resolve_config_path(args.config, std::env::var("MOLIO_CONFIG_PATH").ok());

    let config = match config::load_config(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("molio-export: {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);
    tracing::debug!(source = config_source.as_str(), path = %config_path, "loaded configuration");

    let archive = match output::build_archive(&config) {
        Ok(archive) => archive,
        Err(e) => {
            tracing::error!("document build failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let written = match &args.output {
        Some(path) => std::fs::write(path, &archive),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&archive).and_then(|()| stdout.flush())
        }
    };

    match written {
        Ok(()) => {
            tracing::info!(
                target = args.output.as_deref().unwrap_or("<stdout>"),
                bytes = archive.len(),
                "wrote document archive"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("failed to write archive: {}", e);
            ExitCode::FAILURE
        }
    }
}
