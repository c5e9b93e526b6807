//! Raw CSV tables as published by each provider.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{Error, Result};

/// A provider's table with every cell kept as text.
#[derive(Debug, Clone)]
pub struct RawTable {
    name: String,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl RawTable {
    /// Parses CSV from `reader`. `name` labels the table in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] if the input is not well-formed
    /// CSV (ragged rows, invalid UTF-8, no header row).
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self> {
        let malformed = |e: csv::Error| Error::SourceUnavailable {
            location: name.to_string(),
            reason: format!("malformed CSV: {e}"),
        };

        let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
        let headers = rdr.headers().map_err(malformed)?.clone();
        if headers.is_empty() {
            return Err(Error::SourceUnavailable {
                location: name.to_string(),
                reason: "malformed CSV: no header row".to_string(),
            });
        }

        let rows = rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(malformed)?;

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column` in the header row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the header row lacks `column`,
    /// which means the upstream format changed.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::SchemaMismatch {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_headers_and_rows() {
        let csv = "date, cases ,deaths\n2020-03-01,10,0\n2020-03-02,15,1\n";
        let table = RawTable::from_reader("nyt", csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("cases").unwrap(), 1);
        assert_eq!(&table.rows()[1][2], "1");
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let table = RawTable::from_reader("ctp", "date,positive\n".as_bytes()).unwrap();

        assert!(table.is_empty());
        let err = table.column_index("death").unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { table, column } if table == "ctp" && column == "death"));
    }

    #[test]
    fn test_ragged_rows_are_source_unavailable() {
        let csv = "a,b\n1,2\n3\n";
        let err = RawTable::from_reader("osdh", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }

    #[test]
    fn test_empty_input_is_source_unavailable() {
        let err = RawTable::from_reader("osdh", "".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
