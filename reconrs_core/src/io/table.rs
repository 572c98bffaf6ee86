//! Read field-named records from delimited text, and write delimited tables
//!
//! Two layouts are supported. Export tables have no header row and a fixed column schema
//! given by the caller, with `#` lines treated as comments. Curator tables start with a
//! header row naming their fields.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// A single row, keyed by column name in column order
pub type Record = IndexMap<String, String>;

const COMMENT_MARKER: u8 = b'#';

/// Where a table's column names come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Columns<'a> {
    /// The first row of the table names the columns
    Header,
    /// The table has no header row, the columns are fixed
    Fixed(&'a [&'a str]),
}

/// Read every row of a delimited table, deserializing each into `T`
///
/// Rows shorter than the column list are accepted, their missing fields read as empty. Fields
/// beyond the column list are ignored.
pub fn read_table<T, R>(reader: R, delimiter: u8, columns: Columns) -> Result<Vec<T>, TableError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .flexible(true)
        .quoting(false)
        .comment(Some(COMMENT_MARKER));
    let (mut csv_reader, headers) = match columns {
        Columns::Header => {
            let mut csv_reader = builder.has_headers(true).from_reader(reader);
            let headers = csv_reader.headers()?.clone();
            (csv_reader, headers)
        }
        Columns::Fixed(names) => (
            builder.has_headers(false).from_reader(reader),
            StringRecord::from(names.to_vec()),
        ),
    };

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let mut record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        // missing trailing fields read as empty
        record.truncate(headers.len());
        while record.len() < headers.len() {
            record.push_field("");
        }
        rows.push(record.deserialize(Some(&headers))?);
    }
    Ok(rows)
}

/// Read a table from a file, see [`read_table`]
pub fn read_table_from_path<T, P>(
    path: P,
    delimiter: u8,
    columns: Columns,
) -> Result<Vec<T>, TableError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    read_table(file, delimiter, columns)
}

/// Read a table into untyped [`Record`]s
pub fn read_records<R: Read>(
    reader: R,
    delimiter: u8,
    columns: Columns,
) -> Result<Vec<Record>, TableError> {
    read_table(reader, delimiter, columns)
}

/// Write rows as a delimited table with a header row taken from the field names of `T`
pub fn write_table<T, W>(writer: W, rows: &[T], delimiter: u8) -> Result<(), TableError>
where
    T: Serialize,
    W: Write,
{
    let mut csv_writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write untyped rows beneath a header row
pub fn write_rows<W: Write>(
    writer: W,
    headers: &[String],
    rows: &[Vec<String>],
    delimiter: u8,
) -> Result<(), TableError> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(writer);
    csv_writer.write_record(headers)?;
    for row in rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a table to a file, see [`write_table`]
pub fn write_table_to_path<T, P>(path: P, rows: &[T], delimiter: u8) -> Result<(), TableError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let file = File::create(path)?;
    write_table(file, rows, delimiter)
}

/// Errors from reading or writing delimited tables
#[derive(Error, Debug)]
pub enum TableError {
    /// Malformed row or a field that could not be deserialized
    #[error("Unable to process table: {0}")]
    Csv(#[from] csv::Error),
    /// Unable to open or write the underlying file
    #[error("Unable to access table file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct CompartmentRow {
        identifier: String,
        #[serde(default)]
        name: String,
    }

    #[test]
    fn read_fixed_columns() {
        let source = "# comment line\nMNXC3\tcytoplasm\tMNXC3\nMNXC2\textracellular region\n";
        let rows: Vec<CompartmentRow> =
            read_table(source.as_bytes(), b'\t', Columns::Fixed(&["identifier", "name", "source"]))
                .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier, "MNXC3");
        assert_eq!(rows[1].name, "extracellular region");
    }

    #[test]
    fn read_header_records() {
        let source = "identifier_original\tidentifier_novel\nMNXM1\tMNXM2\n\nMNXM3\tMNXM4\n";
        let records = read_records(source.as_bytes(), b'\t', Columns::Header).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["identifier_original"], "MNXM3");
        assert_eq!(records[1]["identifier_novel"], "MNXM4");
    }

    #[test]
    fn short_rows_use_defaults() {
        let source = "MNXC3\n";
        let rows: Vec<CompartmentRow> =
            read_table(source.as_bytes(), b'\t', Columns::Fixed(&["identifier", "name"])).unwrap();
        assert_eq!(rows[0].name, "");
    }

    #[test]
    fn short_rows_without_trailing_delimiter() {
        let source = "removal_identifier\treplacement_identifier\nMNXM3\tMNXM4\nMNXM7\n";
        let records = read_records(source.as_bytes(), b'\t', Columns::Header).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["removal_identifier"], "MNXM7");
        assert_eq!(records[1]["replacement_identifier"], "");

        let source = "MNXC3\tcytoplasm\tMNXD1\textra\nMNXC2\textracellular region\n";
        let records = read_records(
            source.as_bytes(),
            b'\t',
            Columns::Fixed(&["identifier", "name", "source"]),
        )
        .unwrap();
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[1]["source"], "");
    }

    #[test]
    fn write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compartments.tsv");
        let rows = vec![
            CompartmentRow {
                identifier: "c".to_string(),
                name: "cytosol".to_string(),
            },
            CompartmentRow {
                identifier: "e".to_string(),
                name: "extracellular region".to_string(),
            },
        ];
        write_table_to_path(&path, &rows, b'\t').unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("identifier\tname\n"));
        let read: Vec<CompartmentRow> =
            read_table_from_path(&path, b'\t', Columns::Header).unwrap();
        assert_eq!(read, rows);
    }

    #[test]
    fn missing_file() {
        let result: Result<Vec<Record>, TableError> =
            read_table_from_path("/nonexistent/table.tsv", b'\t', Columns::Header);
        assert!(matches!(result, Err(TableError::Io(_))));
    }
}
