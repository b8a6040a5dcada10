//! Asynchronous CSV reader with batch interface
//!
//! Provides batch reading of ledger commands for the concurrent pipeline.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of LedgerCommands
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::LedgerCommand;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Reads the script in batches and keeps memory use bounded by the batch size.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of commands
    ///
    /// Reads up to `batch_size` valid commands. Malformed rows are logged with
    /// `warn!` and skipped; they do not count towards the batch size.
    ///
    /// # Returns
    ///
    /// The commands in input order. An empty vector means the end of the
    /// script was reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<LedgerCommand> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(command) => batch.push(command),
                    Err(e) => warn!(reason = %e, "skipping malformed row"),
                },
                Some(Err(e)) => warn!(reason = %e, "skipping unparsable row"),
                None => break,
            }
        }

        batch
    }
}
