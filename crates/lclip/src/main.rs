mod cli;
mod commands;

use clap::Parser;
use eyre::WrapErr;

use lclip_core::LabelStore;

use crate::commands::Command;

fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr; stdout carries nothing but pasted values and labels.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let (path, operation) = args.into_parts().unwrap_or_else(|err| err.exit());
    let path = match path {
        Some(path) => path,
        None => lclip_core::default_path().context("resolve store path")?,
    };

    let command = Command::prepare(operation, std::io::stdin().lock())?;

    let mut store = LabelStore::open_locked(&path)
        .wrap_err_with(|| format!("open label store {}", path.display()))?;

    command.run(&mut store, &mut std::io::stdout().lock())?;

    store
        .close()
        .wrap_err_with(|| format!("save label store {}", path.display()))?;
    Ok(())
}
