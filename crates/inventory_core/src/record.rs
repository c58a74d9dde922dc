use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub const STORE_COLUMN: &str = "store";
pub const ITEM_COLUMN: &str = "item";
pub const COUNT_COLUMN: &str = "count";

/// One stock count as written to the inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub store: String,
    pub item: String,
    pub count: i128,
}

impl InventoryRecord {
    /// Coerces the raw column values of a data row. `count` accepts surrounding
    /// whitespace and a sign; anything else that is not an integer is rejected.
    /// The `i128` range covers every 38-digit table number.
    pub fn from_row(row: &RawRow) -> Result<Self, ParseError> {
        let store = required_field(row.row_number, STORE_COLUMN, row.store.as_deref())?;
        let item = required_field(row.row_number, ITEM_COLUMN, row.item.as_deref())?;
        let count_text = required_field(row.row_number, COUNT_COLUMN, row.count.as_deref())?;
        let count = parse_integer(COUNT_COLUMN, &count_text)?;

        Ok(Self { store, item, count })
    }
}

fn required_field(
    row: usize,
    column: &'static str,
    value: Option<&str>,
) -> Result<String, ParseError> {
    value
        .map(str::to_string)
        .ok_or(ParseError::MissingField { row, column })
}

pub(crate) fn parse_integer(field: &'static str, text: &str) -> Result<i128, ParseError> {
    text.trim()
        .parse::<i128>()
        .map_err(|_| ParseError::InvalidInteger {
            field,
            value: text.to_string(),
        })
}

/// Column values of one data row before coercion. A short row leaves the
/// trailing columns as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,
    pub store: Option<String>,
    pub item: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub raw: RawRow,
    pub record: Result<InventoryRecord, ParseError>,
}

#[derive(Debug, Clone, Copy)]
struct HeaderColumns {
    store: usize,
    item: usize,
    count: usize,
}

impl HeaderColumns {
    /// A repeated header name resolves to its last occurrence.
    fn locate(headers: &StringRecord) -> Result<Self, ParseError> {
        let find = |name: &'static str| {
            (0..headers.len())
                .rev()
                .find(|&index| headers.get(index) == Some(name))
                .ok_or(ParseError::MissingColumn(name))
        };

        Ok(Self {
            store: find(STORE_COLUMN)?,
            item: find(ITEM_COLUMN)?,
            count: find(COUNT_COLUMN)?,
        })
    }
}

/// Streams data rows out of a header-delimited inventory file.
///
/// Construction fails when the header lacks one of the `store`, `item` and
/// `count` columns; a completely empty file yields no rows. Iteration yields
/// `Err` only for file-level failures (I/O, invalid UTF-8); a row whose values
/// cannot be coerced is yielded as a `ParsedRow` carrying the row-level error
/// so callers can decide whether to skip it.
pub struct InventoryCsvReader<R> {
    reader: csv::Reader<R>,
    columns: Option<HeaderColumns>,
    current: StringRecord,
    rows_read: usize,
}

impl<R: Read> InventoryCsvReader<R> {
    pub fn new(source: R) -> Result<Self, ParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .from_reader(source);
        let headers = reader.headers()?;
        let columns = if headers.is_empty() {
            None
        } else {
            Some(HeaderColumns::locate(headers)?)
        };

        Ok(Self {
            reader,
            columns,
            current: StringRecord::new(),
            rows_read: 0,
        })
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }
}

impl<R: Read> Iterator for InventoryCsvReader<R> {
    type Item = Result<ParsedRow, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let columns = self.columns?;
        match self.reader.read_record(&mut self.current) {
            Ok(false) => None,
            Ok(true) => {
                self.rows_read += 1;
                let field = |index: usize| self.current.get(index).map(str::to_string);
                let raw = RawRow {
                    row_number: self.rows_read,
                    store: field(columns.store),
                    item: field(columns.item),
                    count: field(columns.count),
                };
                let record = InventoryRecord::from_row(&raw);
                Some(Ok(ParsedRow { raw, record }))
            }
            Err(error) => Some(Err(error.into())),
        }
    }
}
