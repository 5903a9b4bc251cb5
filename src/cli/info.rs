use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{open_manager, wprintln};
use crate::engine::boot::{self, BootPage};
use crate::engine::catalog::{self, SequenceEntry, TableEntry};
use crate::RowdbError;

pub struct InfoOptions {
    pub config: String,
    pub json: bool,
}

#[derive(Serialize)]
struct InfoResultJson {
    data_file: String,
    boot: BootPage,
    tables: Vec<TableReportJson>,
    sequences: Vec<SequenceEntry>,
}

#[derive(Serialize)]
struct TableReportJson {
    #[serde(flatten)]
    entry: TableEntry,
    column_count: usize,
}

pub fn execute(opts: &InfoOptions, writer: &mut dyn Write) -> Result<(), RowdbError> {
    let (config, mut buf) = open_manager(&opts.config)?;

    let boot = match boot::read_boot_page(&mut buf) {
        Ok(boot) if boot.major_version > 0 => boot,
        Ok(_) | Err(RowdbError::ShortRead { .. }) => {
            return Err(RowdbError::Parse(format!(
                "{} is not an initialized database (run `rowdb init` first)",
                config.data_file.display()
            )));
        }
        Err(e) => return Err(e),
    };

    let tables = catalog::scan_tables(&mut buf)?;
    let columns = catalog::scan_columns(&mut buf)?;
    let sequences = catalog::scan_sequences(&mut buf)?;

    let reports: Vec<TableReportJson> = tables
        .into_iter()
        .map(|entry| {
            let column_count = columns
                .iter()
                .filter(|c| c.table_id == entry.object_id)
                .count();
            TableReportJson {
                entry,
                column_count,
            }
        })
        .collect();

    if opts.json {
        let result = InfoResultJson {
            data_file: config.data_file.display().to_string(),
            boot,
            tables: reports,
            sequences,
        };
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| RowdbError::Parse(format!("JSON serialization error: {}", e)))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    wprintln!(writer, "{}", "Database".bold())?;
    wprintln!(writer, "  data file:  {}", config.data_file.display())?;
    wprintln!(
        writer,
        "  version:    {}.{}.{}",
        boot.major_version,
        boot.minor_version,
        boot.patch_num
    )?;
    wprintln!(writer, "  page size:  {} bytes", boot.page_size)?;
    wprintln!(writer)?;

    wprintln!(writer, "{}", "Tables".bold())?;
    for report in &reports {
        let entry = &report.entry;
        wprintln!(
            writer,
            "  {:<20} {} {:>3} columns  pages {}..{}",
            entry.name,
            if entry.kind == "s" {
                "system".dimmed().to_string()
            } else {
                "user  ".to_string()
            },
            report.column_count,
            entry.first_page_id,
            entry.last_page_id
        )?;
    }
    wprintln!(writer)?;

    wprintln!(writer, "{}", "Sequences".bold())?;
    for seq in &sequences {
        wprintln!(
            writer,
            "  {:<20} next {:>6}  increment {}",
            seq.name,
            seq.next_value,
            seq.increment
        )?;
    }
    Ok(())
}
