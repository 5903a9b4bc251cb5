use std::io::Write;

use colored::Colorize;

use crate::cli::{open_manager, wprintln};
use crate::engine::catalog;
use crate::engine::datum::DataType;
use crate::engine::record::Column;
use crate::RowdbError;

pub struct CreateTableOptions {
    pub config: String,
    pub name: String,
    pub columns: Vec<String>,
}

pub fn execute(opts: &CreateTableOptions, writer: &mut dyn Write) -> Result<(), RowdbError> {
    let columns = opts
        .columns
        .iter()
        .enumerate()
        .map(|(colnum, spec)| parse_column_spec(colnum, spec))
        .collect::<Result<Vec<Column>, RowdbError>>()?;

    let (_, mut buf) = open_manager(&opts.config)?;
    let object_id = catalog::create_table(&mut buf, &opts.name, &columns)?;
    buf.flush_all()?;

    wprintln!(
        writer,
        "{} created table {} (object id {}, {} columns)",
        "ok:".green().bold(),
        opts.name.bold(),
        object_id,
        columns.len()
    )?;
    Ok(())
}

/// Parse one `name:type[:notnull]` column spec. Types: `tinyint`,
/// `smallint`, `int`, `bigint`, `bool`, `char(N)`, `varchar(N)`.
pub fn parse_column_spec(colnum: usize, spec: &str) -> Result<Column, RowdbError> {
    let mut parts = spec.split(':');
    let name = parts
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| RowdbError::Parse(format!("column spec {:?} has no name", spec)))?;
    let type_token = parts
        .next()
        .ok_or_else(|| RowdbError::Parse(format!("column spec {:?} has no type", spec)))?;

    let not_null = match parts.next() {
        None => false,
        Some("notnull") => true,
        Some(other) => {
            return Err(RowdbError::Parse(format!(
                "unexpected column spec suffix {:?} (only `notnull` is allowed)",
                other
            )))
        }
    };

    let (data_type, max_len) = parse_type_token(type_token)?;
    Ok(Column::new(name, data_type, colnum, max_len, not_null))
}

fn parse_type_token(token: &str) -> Result<(DataType, usize), RowdbError> {
    match token {
        "tinyint" => return Ok((DataType::TinyInt, 1)),
        "smallint" => return Ok((DataType::SmallInt, 2)),
        "int" => return Ok((DataType::Int, 4)),
        "bigint" => return Ok((DataType::BigInt, 8)),
        "bool" => return Ok((DataType::Bool, 1)),
        _ => {}
    }

    let sized = |prefix: &str| -> Option<Result<usize, RowdbError>> {
        let body = token.strip_prefix(prefix)?.strip_suffix(')')?;
        Some(
            body.parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    RowdbError::Parse(format!("bad length in type {:?}", token))
                }),
        )
    };

    if let Some(len) = sized("char(") {
        return Ok((DataType::Char, len?));
    }
    if let Some(len) = sized("varchar(") {
        return Ok((DataType::VarChar, len?));
    }
    Err(RowdbError::Parse(format!("unknown column type {:?}", token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_types() {
        let col = parse_column_spec(0, "person_id:int:notnull").unwrap();
        assert_eq!(col.name, "person_id");
        assert_eq!(col.data_type, DataType::Int);
        assert_eq!(col.max_len, 4);
        assert!(col.not_null);

        let col = parse_column_spec(2, "active:bool").unwrap();
        assert_eq!(col.colnum, 2);
        assert_eq!(col.data_type, DataType::Bool);
        assert!(!col.not_null);
    }

    #[test]
    fn test_parse_sized_types() {
        let col = parse_column_spec(1, "first_name:varchar(20)").unwrap();
        assert_eq!(col.data_type, DataType::VarChar);
        assert_eq!(col.max_len, 20);

        let col = parse_column_spec(1, "code:char(8):notnull").unwrap();
        assert_eq!(col.data_type, DataType::Char);
        assert_eq!(col.max_len, 8);
        assert!(col.not_null);
    }

    #[test]
    fn test_parse_rejects_malformed_specs() {
        assert!(parse_column_spec(0, "age").is_err());
        assert!(parse_column_spec(0, "age:floatish").is_err());
        assert!(parse_column_spec(0, "name:varchar(abc)").is_err());
        assert!(parse_column_spec(0, "name:varchar(0)").is_err());
        assert!(parse_column_spec(0, "age:int:unique").is_err());
        assert!(parse_column_spec(0, ":int").is_err());
    }
}
