use std::io::Write;

use colored::Colorize;

use crate::cli::{open_manager, wprintln};
use crate::engine::access;
use crate::engine::datum::{DataType, Datum};
use crate::engine::record::Column;
use crate::RowdbError;

pub struct InsertOptions {
    pub config: String,
    pub table: String,
    pub values: Vec<String>,
}

pub fn execute(opts: &InsertOptions, writer: &mut dyn Write) -> Result<(), RowdbError> {
    let (_, mut buf) = open_manager(&opts.config)?;

    let td = access::load_table_desc(&mut buf, &opts.table)?
        .ok_or_else(|| RowdbError::TableNotFound(opts.table.clone()))?;

    if opts.values.len() != td.desc.ncols() {
        return Err(RowdbError::Parse(format!(
            "table {} has {} columns, got {} values",
            opts.table,
            td.desc.ncols(),
            opts.values.len()
        )));
    }

    let values = td
        .desc
        .columns()
        .iter()
        .zip(&opts.values)
        .map(|(col, raw)| coerce_value(col, raw))
        .collect::<Result<Vec<Option<Datum>>, RowdbError>>()?;

    access::insert(&mut buf, &td, &values)?;
    buf.flush_all()?;

    wprintln!(
        writer,
        "{} inserted 1 row into {}",
        "ok:".green().bold(),
        opts.table.bold()
    )?;
    Ok(())
}

/// Turn a command-line token into a typed value for `col`. The literal
/// `null` (any case) inserts a NULL.
fn coerce_value(col: &Column, raw: &str) -> Result<Option<Datum>, RowdbError> {
    if raw.eq_ignore_ascii_case("null") {
        if col.not_null {
            return Err(RowdbError::Parse(format!(
                "column {} is NOT NULL",
                col.name
            )));
        }
        return Ok(None);
    }

    let bad = |_| {
        RowdbError::Parse(format!(
            "cannot parse {:?} as {} for column {}",
            raw,
            col.data_type.name(),
            col.name
        ))
    };

    let datum = match col.data_type {
        DataType::TinyInt => Datum::TinyInt(raw.parse().map_err(bad)?),
        DataType::SmallInt => Datum::SmallInt(raw.parse().map_err(bad)?),
        DataType::Int => Datum::Int(raw.parse().map_err(bad)?),
        DataType::BigInt => Datum::BigInt(raw.parse().map_err(bad)?),
        DataType::Bool => match raw {
            "true" | "t" | "1" => Datum::Bool(true),
            "false" | "f" | "0" => Datum::Bool(false),
            _ => {
                return Err(RowdbError::Parse(format!(
                    "cannot parse {:?} as bool for column {}",
                    raw, col.name
                )))
            }
        },
        DataType::Char => Datum::Char(raw.to_string()),
        DataType::VarChar => Datum::VarChar(raw.to_string()),
    };
    Ok(Some(datum))
}
