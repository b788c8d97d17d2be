// src/table/mod.rs
use csv::ReaderBuilder;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
    sync::Arc,
};
use tracing::debug;

use crate::config::ascii_byte;
use crate::error::{Error, Result};

pub mod nested;

pub use nested::{index_by_key, read_nested_table, NestedTable};

/// Field names of a table, fixed once the header line has been read.
#[derive(Debug, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    /// name → column; a repeated name resolves to its last column.
    positions: HashMap<String, usize>,
}

impl Header {
    pub fn new(names: Vec<String>) -> Self {
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }
}

/// One data line, read against its table's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    header: Arc<Header>,
    values: Vec<String>,
}

impl Row {
    pub fn new(header: Arc<Header>, values: Vec<String>) -> Self {
        Self { header, values }
    }

    /// Value of `field`, or `None` when the header lacks the field or the line
    /// was too short to reach it. An empty string is a present-but-empty value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.header
            .position(field)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// (name, value) pairs for every header field this row reaches.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.header
            .names()
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A delimited table held entirely in memory.
#[derive(Debug, Clone)]
pub struct Table {
    header: Arc<Header>,
    rows: Vec<Row>,
}

impl Table {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read the delimited file at `path`. The first line names the fields; every
/// following non-blank line becomes a `Row`.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P, separator: char, quote: char) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_table(BufReader::new(file), separator, quote).map_err(|e| match e {
        Error::Csv { source, .. } => Error::Csv {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    debug!(rows = table.len(), fields = table.header.names.len(), "table loaded");
    Ok(table)
}

/// Parse an already opened source. Errors carry an empty path.
pub fn parse_table<R: Read>(source: R, separator: char, quote: char) -> Result<Table> {
    let csv_err = |source: csv::Error| Error::Csv {
        path: Default::default(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short lines keep whatever fields they have
        .delimiter(ascii_byte(separator, "separator")?)
        .quote(ascii_byte(quote, "quote")?)
        .from_reader(source);

    let names: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    let header = Arc::new(Header::new(names));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        let values: Vec<String> = record
            .iter()
            .take(header.names.len())
            .map(str::to_string)
            .collect();
        rows.push(Row::new(Arc::clone(&header), values));
    }

    Ok(Table { header, rows })
}
