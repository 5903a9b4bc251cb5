#[cfg(not(feature = "cli"))]
compile_error!("The `rowdb` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use tracing_subscriber::EnvFilter;

use rowdb::cli;
use rowdb::cli::app::{Cli, ColorMode, Commands};
use rowdb::RowdbError;

fn main() {
    let cli = Cli::parse();

    // Library diagnostics go to stderr, controlled by ROWDB_LOG
    // (e.g. `ROWDB_LOG=rowdb=debug rowdb init`).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("ROWDB_LOG"))
        .with_writer(std::io::stderr)
        .init();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, RowdbError> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| RowdbError::Io(format!("Cannot create {}: {}", path, e))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init => cli::init::execute(
            &cli::init::InitOptions {
                config: cli.config.clone(),
            },
            &mut writer,
        ),

        Commands::CreateTable { name, columns } => cli::create_table::execute(
            &cli::create_table::CreateTableOptions {
                config: cli.config.clone(),
                name,
                columns,
            },
            &mut writer,
        ),

        Commands::Insert { table, values } => cli::insert::execute(
            &cli::insert::InsertOptions {
                config: cli.config.clone(),
                table,
                values,
            },
            &mut writer,
        ),

        Commands::Scan { table, json } => cli::scan::execute(
            &cli::scan::ScanOptions {
                config: cli.config.clone(),
                table,
                json,
            },
            &mut writer,
        ),

        Commands::Info { json } => cli::info::execute(
            &cli::info::InfoOptions {
                config: cli.config.clone(),
                json,
            },
            &mut writer,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
