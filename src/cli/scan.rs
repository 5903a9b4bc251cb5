use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{open_manager, wprintln};
use crate::engine::access;
use crate::engine::datum::Datum;
use crate::RowdbError;

pub struct ScanOptions {
    pub config: String,
    pub table: String,
    pub json: bool,
}

#[derive(Serialize)]
struct ScanResultJson<'a> {
    table: &'a str,
    columns: Vec<&'a str>,
    rows: &'a [Vec<Option<Datum>>],
}

pub fn execute(opts: &ScanOptions, writer: &mut dyn Write) -> Result<(), RowdbError> {
    let (_, mut buf) = open_manager(&opts.config)?;

    let td = access::load_table_desc(&mut buf, &opts.table)?
        .ok_or_else(|| RowdbError::TableNotFound(opts.table.clone()))?;
    let rows = access::fullscan(&mut buf, &td)?;

    if opts.json {
        let result = ScanResultJson {
            table: &opts.table,
            columns: td.desc.columns().iter().map(|c| c.name.as_str()).collect(),
            rows: &rows,
        };
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| RowdbError::Parse(format!("JSON serialization error: {}", e)))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    let header = td
        .desc
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" | ");
    wprintln!(writer, "{}", header.bold())?;
    wprintln!(writer, "{}", "-".repeat(header.len()))?;

    for row in &rows {
        let line = row
            .iter()
            .map(|value| match value {
                Some(datum) => datum.to_string(),
                None => "NULL".dimmed().to_string(),
            })
            .collect::<Vec<_>>()
            .join(" | ");
        wprintln!(writer, "{}", line)?;
    }

    wprintln!(writer)?;
    wprintln!(
        writer,
        "{} row{} in {}",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" },
        opts.table
    )?;
    Ok(())
}
