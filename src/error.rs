use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Header truncated: need {expected} bytes, found {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    #[error("Channel table truncated in field '{field}': need {expected} bytes, found {actual}")]
    TruncatedChannelTable {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Sample region truncated: need {expected} bytes, found {actual}")]
    TruncatedSampleRegion { expected: usize, actual: usize },

    #[error("Data record layout too large: {0}")]
    LayoutOverflow(String),

    #[error("{n_data_records} records of {record_duration_ms} ms exceed the time range")]
    RecordingTooLong {
        n_data_records: i64,
        record_duration_ms: i64,
    },

    #[error("Invalid start timestamp: {0:?}")]
    BadTimestamp(String),

    #[error("Invalid field '{field}' at byte {offset}: {reason}")]
    InvalidField {
        field: String,
        offset: usize,
        reason: String,
    },

    #[error("Header size {declared} does not match computed size {computed}")]
    InconsistentHeaderSize { declared: i64, computed: i64 },

    #[error("Invalid number of signals: {0}")]
    InvalidSignalCount(i64),

    #[error("Invalid number of data records: {0}")]
    InvalidRecordCount(i64),

    #[error("Invalid data record duration: {0} ms")]
    InvalidRecordDuration(i64),

    #[error("Signal index {0} out of range")]
    InvalidSignalIndex(usize),
}

pub type Result<T> = std::result::Result<T, EdfError>;
