//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over ledger commands from a command script.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging
//!
//! ```no_run
//! use marketplace_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("script.csv")).unwrap();
//! let commands: Vec<_> = reader.filter_map(Result::ok).collect();
//! println!("Parsed {} commands", commands.len());
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerCommand, LedgerError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one row at a time, so memory use does not grow with the script.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing optional columns may be omitted)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(LedgerError::FileNotFound)` if the file does not exist
    /// * `Err(LedgerError::IoError)` if it could not be opened otherwise
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::open_failed(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<LedgerCommand, LedgerError>;

    /// Get the next command from the script
    ///
    /// # Returns
    ///
    /// * `Some(Ok(LedgerCommand))` - Successfully parsed row
    /// * `Some(Err(LedgerError::ParseError))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let next = self.reader.deserialize::<CsvRecord>().next()?;
        self.line_num += 1;

        let command = next
            .map_err(LedgerError::from)
            .and_then(convert_csv_record)
            .map_err(|e| e.at_line(self.line_num));
        Some(command)
    }
}
