//! Command-line interface: discover connected boards and print a report.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use mbedls::tracing::{self, prelude::*};
use mbedls::{BoardCatalog, BoardRecord, Error};

/// List connected mbed development boards.
#[derive(Parser, Debug)]
#[command(name = "mbedls", version, about)]
struct Cli {
    /// Load board definitions from a JSON file instead of the built-in
    /// table.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Emit machine-readable JSON instead of the table.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            exit_code(&err)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let catalog = match &cli.catalog {
        // No added context: the error already names the file, and wrapping
        // would hide the variant the exit-code mapping looks for.
        Some(path) => BoardCatalog::from_json_file(path)?,
        None => BoardCatalog::builtin(),
    };

    let records = discover_boards(&catalog)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", mbedls::report::render_table(&records));
    }
    Ok(())
}

#[cfg(windows)]
fn discover_boards(catalog: &BoardCatalog) -> anyhow::Result<Vec<BoardRecord>> {
    use mbedls::registry::WindowsRegistry;
    let records =
        mbedls::discover(&WindowsRegistry, &mbedls::FsMountCheck, catalog)?;
    Ok(records)
}

#[cfg(not(windows))]
fn discover_boards(_catalog: &BoardCatalog) -> anyhow::Result<Vec<BoardRecord>> {
    Err(Error::Unsupported.into())
}

/// Map failure classes to distinct exit codes: the environment being
/// unusable (1) versus bad input data (2).
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(Error::MalformedRecord(_)) | Some(Error::Catalog(_)) => {
            ExitCode::from(2)
        }
        _ => ExitCode::from(1),
    }
}
