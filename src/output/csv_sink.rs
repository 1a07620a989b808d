//! Append-only CSV destination for filing records

use crate::output::OutputResult;
use crate::record::{FilingRecord, COLUMNS};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// CSV writer that appends to an existing file
///
/// The header row is written only when the file is empty at open time.
/// Rows are never deduplicated.
pub struct CsvSink {
    writer: csv::Writer<File>,
    written: u64,
}

impl CsvSink {
    /// Opens `path` for appending, creating it if needed
    ///
    /// # Returns
    ///
    /// * `Ok(CsvSink)` - Ready to append; the header is already written for an empty file
    /// * `Err(OutputError)` - The file could not be opened or the header written
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_empty {
            writer.write_record(COLUMNS)?;
        }

        Ok(Self { writer, written: 0 })
    }

    /// Appends one record
    pub fn write(&mut self, record: &FilingRecord) -> OutputResult<()> {
        self.writer.serialize(record)?;
        self.written += 1;
        Ok(())
    }

    /// Appends every record in order
    pub fn write_all<'a, I>(&mut self, records: I) -> OutputResult<()>
    where
        I: IntoIterator<Item = &'a FilingRecord>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Number of records appended through this handle
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and closes the file, returning the record count
    pub fn close(mut self) -> OutputResult<u64> {
        self.writer.flush()?;
        Ok(self.written)
    }
}
