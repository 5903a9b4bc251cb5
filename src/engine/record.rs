//! Row serialization.
//!
//! A record is the on-disk image of one row: a 12-byte header
//! (`xmin`, `xmax`, `infomask`, `nullOffset`), the fixed-width column
//! values in declaration order, an optional null bitmap, then the
//! variable-width column values in declaration order. Null values occupy
//! no bytes at all; the bitmap is the only trace they leave.
//!
//! The null bitmap holds one bit per column, LSB-first across bytes,
//! indexed by the column's `colnum` (declaration position). A set bit
//! means the value is present. The bitmap exists only when the descriptor
//! declares at least one nullable column, and its position is recorded in
//! the header's `nullOffset` field because the fixed-value region in
//! front of it shrinks when fixed values are null.
//!
//! Serialization groups fixed columns before variable ones, but callers
//! always see rows in declaration order: values are indexed by `colnum`
//! both on the way in ([`fill_record`]) and on the way out
//! ([`defill_record`]).

use byteorder::{ByteOrder, LittleEndian};

use crate::engine::constants::{RECORD_HEADER_SIZE, REC_NULL_OFFSET};
use crate::engine::datum::{DataType, Datum};
use crate::RowdbError;

/// One column of a record descriptor.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared data type.
    pub data_type: DataType,
    /// 0-based declaration position.
    pub colnum: usize,
    /// Declared maximum length in bytes. For integer and bool types this
    /// matches the type width; for `CHAR`/`VARCHAR` it is the declared
    /// capacity.
    pub max_len: usize,
    /// Whether the column rejects nulls.
    pub not_null: bool,
}

impl Column {
    pub fn new<S: Into<String>>(
        name: S,
        data_type: DataType,
        colnum: usize,
        max_len: usize,
        not_null: bool,
    ) -> Self {
        Column {
            name: name.into(),
            data_type,
            colnum,
            max_len,
            not_null,
        }
    }

    /// Serialized width of a present value, or `None` for variable-width
    /// columns.
    fn fixed_width(&self) -> Option<usize> {
        match self.data_type {
            DataType::TinyInt | DataType::Bool => Some(1),
            DataType::SmallInt => Some(2),
            DataType::Int => Some(4),
            DataType::BigInt => Some(8),
            DataType::Char => Some(self.max_len),
            DataType::VarChar => None,
        }
    }
}

/// The shape of a record: columns in declaration order.
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    columns: Vec<Column>,
}

impl RecordDescriptor {
    /// Build a descriptor from columns in declaration order.
    pub fn new(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns.iter().enumerate().all(|(i, c)| c.colnum == i),
            "columns must be supplied in declaration order with dense colnums"
        );
        RecordDescriptor { columns }
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Count of fixed-width (non-`VARCHAR`) columns.
    pub fn nfixed(&self) -> usize {
        self.columns.iter().filter(|c| c.data_type.is_fixed()).count()
    }

    pub fn has_nullable(&self) -> bool {
        self.columns.iter().any(|c| !c.not_null)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Fixed-width columns in declaration order.
    pub fn fixed_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.data_type.is_fixed())
    }

    /// Variable-width columns in declaration order.
    pub fn var_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.data_type.is_fixed())
    }

    /// Bytes occupied by the null bitmap: zero when nothing is nullable.
    pub fn null_bitmap_len(&self) -> usize {
        if self.has_nullable() {
            self.ncols() / 8 + 1
        } else {
            0
        }
    }
}

/// Is the bit for `colnum` set (value present)?
fn value_present(bitmap: &[u8], colnum: usize) -> bool {
    bitmap[colnum / 8] & (1 << (colnum % 8)) != 0
}

/// Bytes the fixed-value region occupies for a particular row: null fixed
/// values contribute nothing.
fn fixed_region_len(desc: &RecordDescriptor, values: &[Option<Datum>]) -> usize {
    desc.fixed_columns()
        .filter(|col| values[col.colnum].is_some())
        .map(|col| col.fixed_width().unwrap_or(0))
        .sum()
}

/// Total serialized length of a row: header, present fixed values, null
/// bitmap, and length-prefixed variable values (truncated to their
/// declared capacity).
pub fn compute_record_length(desc: &RecordDescriptor, values: &[Option<Datum>]) -> usize {
    debug_assert_eq!(values.len(), desc.ncols());

    let mut len = RECORD_HEADER_SIZE + fixed_region_len(desc, values) + desc.null_bitmap_len();
    for col in desc.var_columns() {
        if let Some(datum) = &values[col.colnum] {
            let payload = datum.as_str().map_or(0, |s| s.len().min(col.max_len));
            len += payload + 2;
        }
    }
    len
}

/// Serialize a row into `buf`.
///
/// `buf` must be exactly [`compute_record_length`] bytes. The record
/// header is written here too: `xmin`/`xmax`/`infomask` zero (no
/// transaction machinery yet) and `nullOffset` pointing at the bitmap
/// when the descriptor has nullable columns.
pub fn fill_record(desc: &RecordDescriptor, values: &[Option<Datum>], buf: &mut [u8]) {
    debug_assert_eq!(values.len(), desc.ncols());
    debug_assert_eq!(buf.len(), compute_record_length(desc, values));
    debug_assert!(
        desc.columns().iter().all(|col| {
            match &values[col.colnum] {
                Some(datum) => datum.data_type() == col.data_type,
                None => desc.has_nullable(),
            }
        }),
        "values must match the descriptor's column types and nullability"
    );

    buf[..RECORD_HEADER_SIZE].fill(0);

    let bitmap_len = desc.null_bitmap_len();
    let bitmap_at = RECORD_HEADER_SIZE + fixed_region_len(desc, values);
    if bitmap_len > 0 {
        LittleEndian::write_u16(&mut buf[REC_NULL_OFFSET..], bitmap_at as u16);
        buf[bitmap_at..bitmap_at + bitmap_len].fill(0);
        for col in desc.columns() {
            if values[col.colnum].is_some() {
                buf[bitmap_at + col.colnum / 8] |= 1 << (col.colnum % 8);
            }
        }
    }

    let mut at = RECORD_HEADER_SIZE;
    for col in desc.fixed_columns() {
        let Some(datum) = &values[col.colnum] else {
            continue;
        };
        match datum {
            Datum::TinyInt(v) => {
                buf[at] = *v;
                at += 1;
            }
            Datum::SmallInt(v) => {
                LittleEndian::write_i16(&mut buf[at..], *v);
                at += 2;
            }
            Datum::Int(v) => {
                LittleEndian::write_i32(&mut buf[at..], *v);
                at += 4;
            }
            Datum::BigInt(v) => {
                LittleEndian::write_i64(&mut buf[at..], *v);
                at += 8;
            }
            Datum::Bool(v) => {
                buf[at] = u8::from(*v);
                at += 1;
            }
            Datum::Char(s) => {
                let bytes = s.as_bytes();
                let n = bytes.len().min(col.max_len);
                buf[at..at + n].copy_from_slice(&bytes[..n]);
                buf[at + n..at + col.max_len].fill(0);
                at += col.max_len;
            }
            Datum::VarChar(_) => unreachable!("varchar in fixed column set"),
        }
    }

    at += bitmap_len;
    for col in desc.var_columns() {
        let Some(datum) = &values[col.colnum] else {
            continue;
        };
        let bytes = datum.as_str().map_or(&b""[..], |s| s.as_bytes());
        let n = bytes.len().min(col.max_len);
        LittleEndian::write_u16(&mut buf[at..], (n + 2) as u16);
        buf[at + 2..at + 2 + n].copy_from_slice(&bytes[..n]);
        at += n + 2;
    }
}

/// Serialize a row into a freshly allocated buffer.
pub fn build_record(desc: &RecordDescriptor, values: &[Option<Datum>]) -> Vec<u8> {
    let mut buf = vec![0u8; compute_record_length(desc, values)];
    fill_record(desc, values, &mut buf);
    buf
}

fn field<'a>(buf: &'a [u8], at: usize, len: usize) -> Result<&'a [u8], RowdbError> {
    buf.get(at..at + len).ok_or_else(|| {
        RowdbError::Parse(format!(
            "record truncated: need {} bytes at offset {}, have {}",
            len,
            at,
            buf.len()
        ))
    })
}

/// Deserialize a record into values indexed by `colnum`. Nulls come back
/// as `None`.
pub fn defill_record(
    desc: &RecordDescriptor,
    buf: &[u8],
) -> Result<Vec<Option<Datum>>, RowdbError> {
    if buf.len() < RECORD_HEADER_SIZE {
        return Err(RowdbError::Parse(format!(
            "record shorter than its header: {} bytes",
            buf.len()
        )));
    }

    let bitmap_len = desc.null_bitmap_len();
    let bitmap = if bitmap_len > 0 {
        let null_offset = LittleEndian::read_u16(&buf[REC_NULL_OFFSET..]) as usize;
        Some(field(buf, null_offset, bitmap_len)?)
    } else {
        None
    };
    let present =
        |colnum: usize| bitmap.map_or(true, |bitmap| value_present(bitmap, colnum));

    let mut values: Vec<Option<Datum>> = vec![None; desc.ncols()];

    let mut at = RECORD_HEADER_SIZE;
    for col in desc.fixed_columns() {
        if !present(col.colnum) {
            continue;
        }
        let width = col.fixed_width().unwrap_or(0);
        let bytes = field(buf, at, width)?;
        values[col.colnum] = Some(match col.data_type {
            DataType::TinyInt => Datum::TinyInt(bytes[0]),
            DataType::SmallInt => Datum::SmallInt(LittleEndian::read_i16(bytes)),
            DataType::Int => Datum::Int(LittleEndian::read_i32(bytes)),
            DataType::BigInt => Datum::BigInt(LittleEndian::read_i64(bytes)),
            DataType::Bool => Datum::Bool(bytes[0] != 0),
            DataType::Char => {
                let trimmed = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                Datum::Char(String::from_utf8_lossy(&bytes[..trimmed]).into_owned())
            }
            DataType::VarChar => unreachable!("varchar in fixed column set"),
        });
        at += width;
    }

    at += bitmap_len;
    for col in desc.var_columns() {
        if !present(col.colnum) {
            continue;
        }
        let total = LittleEndian::read_u16(field(buf, at, 2)?) as usize;
        if total < 2 {
            return Err(RowdbError::Parse(format!(
                "varchar length prefix {} below overhead at offset {}",
                total, at
            )));
        }
        let payload = field(buf, at + 2, total - 2)?;
        values[col.colnum] = Some(Datum::VarChar(
            String::from_utf8_lossy(payload).into_owned(),
        ));
        at += total;
    }

    Ok(values)
}

/// Byte offset from record start to a fixed-width column's value, for
/// in-place updates. Defined only when the target column is fixed-width
/// and present in this record; variable columns and null targets yield
/// `None`.
pub fn compute_offset_to_column(
    desc: &RecordDescriptor,
    buf: &[u8],
    colnum: usize,
) -> Option<usize> {
    let bitmap_len = desc.null_bitmap_len();
    let bitmap = if bitmap_len > 0 {
        let null_offset =
            LittleEndian::read_u16(buf.get(REC_NULL_OFFSET..REC_NULL_OFFSET + 2)?) as usize;
        Some(buf.get(null_offset..null_offset + bitmap_len)?)
    } else {
        None
    };
    let present =
        |colnum: usize| bitmap.map_or(true, |bitmap| value_present(bitmap, colnum));

    let mut at = RECORD_HEADER_SIZE;
    for col in desc.fixed_columns() {
        if col.colnum == colnum {
            return present(colnum).then_some(at);
        }
        if present(col.colnum) {
            at += col.fixed_width().unwrap_or(0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// person(person_id INT NOT NULL, first_name VARCHAR(20),
    ///        last_name VARCHAR(20) NOT NULL, age INT)
    fn person_desc() -> RecordDescriptor {
        RecordDescriptor::new(vec![
            Column::new("person_id", DataType::Int, 0, 4, true),
            Column::new("first_name", DataType::VarChar, 1, 20, false),
            Column::new("last_name", DataType::VarChar, 2, 20, true),
            Column::new("age", DataType::Int, 3, 4, false),
        ])
    }

    #[test]
    fn test_descriptor_decomposition() {
        let desc = person_desc();
        assert_eq!(desc.ncols(), 4);
        assert_eq!(desc.nfixed(), 2);
        assert_eq!(desc.nfixed() + desc.var_columns().count(), desc.ncols());
        assert!(desc.has_nullable());
        assert_eq!(desc.null_bitmap_len(), 1);
    }

    #[test]
    fn test_round_trip_all_present() {
        let desc = person_desc();
        let values = vec![
            Some(Datum::Int(1)),
            Some(Datum::VarChar("Ada".into())),
            Some(Datum::VarChar("Lovelace".into())),
            Some(Datum::Int(36)),
        ];

        let record = build_record(&desc, &values);
        // 12 header + 8 fixed + 1 bitmap + (2+3) + (2+8) varlen.
        assert_eq!(record.len(), 36);

        // Bitmap sits right after the fixed values and has all four
        // low bits set.
        let null_offset = LittleEndian::read_u16(&record[REC_NULL_OFFSET..]) as usize;
        assert_eq!(null_offset, 20);
        assert_eq!(record[null_offset], 0b0000_1111);

        assert_eq!(defill_record(&desc, &record).unwrap(), values);
    }

    #[test]
    fn test_round_trip_with_nulls() {
        let desc = person_desc();
        let values = vec![
            Some(Datum::Int(2)),
            None,
            Some(Datum::VarChar("Curie".into())),
            None,
        ];

        let record = build_record(&desc, &values);
        // 12 header + 4 fixed (age elided) + 1 bitmap + (2+5) varlen.
        assert_eq!(record.len(), 24);

        // Bits are indexed by colnum: person_id and last_name present.
        let null_offset = LittleEndian::read_u16(&record[REC_NULL_OFFSET..]) as usize;
        assert_eq!(null_offset, 16);
        assert_eq!(record[null_offset], 0b0000_0101);

        assert_eq!(defill_record(&desc, &record).unwrap(), values);
    }

    #[test]
    fn test_varchar_truncates_to_declared_length() {
        let desc = RecordDescriptor::new(vec![Column::new(
            "tag",
            DataType::VarChar,
            0,
            5,
            false,
        )]);
        let values = vec![Some(Datum::VarChar("overflowing".into()))];
        let record = build_record(&desc, &values);
        let back = defill_record(&desc, &record).unwrap();
        assert_eq!(back[0], Some(Datum::VarChar("overf".into())));
    }

    #[test]
    fn test_char_pads_and_trims() {
        let desc = RecordDescriptor::new(vec![
            Column::new("code", DataType::Char, 0, 8, true),
            Column::new("flag", DataType::Bool, 1, 1, true),
        ]);
        let values = vec![Some(Datum::Char("ab".into())), Some(Datum::Bool(true))];

        let record = build_record(&desc, &values);
        // No nullable columns: no bitmap, nullOffset stays zero.
        assert_eq!(record.len(), 12 + 8 + 1);
        assert_eq!(LittleEndian::read_u16(&record[REC_NULL_OFFSET..]), 0);
        assert_eq!(&record[12..20], b"ab\0\0\0\0\0\0");

        let back = defill_record(&desc, &record).unwrap();
        assert_eq!(back[0], Some(Datum::Char("ab".into())));
        assert_eq!(back[1], Some(Datum::Bool(true)));
    }

    #[test]
    fn test_char_truncates_to_declared_length() {
        let desc = RecordDescriptor::new(vec![Column::new("code", DataType::Char, 0, 3, true)]);
        let record = build_record(&desc, &[Some(Datum::Char("wxyz".into()))]);
        let back = defill_record(&desc, &record).unwrap();
        assert_eq!(back[0], Some(Datum::Char("wxy".into())));
    }

    #[test]
    fn test_wide_descriptor_bitmap_spans_bytes() {
        // Nine nullable tinyints force a two-byte bitmap.
        let cols: Vec<Column> = (0..9)
            .map(|i| Column::new(format!("c{}", i), DataType::TinyInt, i, 1, false))
            .collect();
        let desc = RecordDescriptor::new(cols);
        assert_eq!(desc.null_bitmap_len(), 2);

        let mut values: Vec<Option<Datum>> = (0..9).map(|i| Some(Datum::TinyInt(i))).collect();
        values[3] = None;
        values[8] = None;

        let record = build_record(&desc, &values);
        let back = defill_record(&desc, &record).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_offset_to_column_skips_null_fixed_values() {
        let desc = person_desc();
        let values = vec![
            Some(Datum::Int(9)),
            None,
            Some(Datum::VarChar("Hopper".into())),
            Some(Datum::Int(45)),
        ];
        let record = build_record(&desc, &values);

        assert_eq!(compute_offset_to_column(&desc, &record, 0), Some(12));
        assert_eq!(compute_offset_to_column(&desc, &record, 3), Some(16));
        // Variable columns have no fixed offset.
        assert_eq!(compute_offset_to_column(&desc, &record, 2), None);

        // A null target has no offset either.
        let values = vec![
            Some(Datum::Int(9)),
            None,
            Some(Datum::VarChar("Hopper".into())),
            None,
        ];
        let record = build_record(&desc, &values);
        assert_eq!(compute_offset_to_column(&desc, &record, 3), None);
    }

    #[test]
    fn test_defill_rejects_truncated_buffer() {
        let desc = person_desc();
        let values = vec![
            Some(Datum::Int(1)),
            Some(Datum::VarChar("Ada".into())),
            Some(Datum::VarChar("Lovelace".into())),
            Some(Datum::Int(36)),
        ];
        let record = build_record(&desc, &values);
        assert!(defill_record(&desc, &record[..record.len() - 4]).is_err());
        assert!(defill_record(&desc, &record[..8]).is_err());
    }
}
