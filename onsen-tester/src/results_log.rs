//! Append-only result log on disk.
use onsen_game::{RecoveryRecord, ResultSink};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Appends one line per spontaneous recovery to a file, creating it on demand.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

impl ResultSink for FileSink {
    type Error = io::Error;

    fn append(&mut self, record: &RecoveryRecord) -> Result<(), Self::Error> {
        let mut file = self.open()?;
        file.write_all(record.to_csv_line().as_bytes())?;
        file.flush()
    }
}
