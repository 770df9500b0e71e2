//! # edfframe
//!
//! Decodes European Data Format (EDF) biosignal recordings into an in-memory,
//! time-indexed table with one column per recorded signal.
//!
//! An EDF file is a 256-byte text header, a channel table stored field by
//! field, and a run of fixed-duration data records. Each record holds one
//! burst of 16-bit samples per channel, channel after channel. This crate
//! parses the header and channel table, pulls every channel's samples out of
//! the records, puts them on a time axis and joins the channels into one
//! table.
//!
//! ## Quick Start
//!
//! ```rust
//! use edfframe::{EdfReader, Result};
//!
//! fn main() -> Result<()> {
//!     # edfframe::doctest_utils::create_two_channel_test_file("quick_start.edf")?;
//!     let reader = EdfReader::open("quick_start.edf")?;
//!
//!     let header = reader.header();
//!     println!("Channels: {}", header.n_channels);
//!     println!("Start: {}", header.start);
//!
//!     let table = reader.into_table();
//!     println!("{} rows x {} columns", table.height(), table.width());
//!
//!     for column in table.columns() {
//!         let present = column.samples().count();
//!         println!("{}: {} samples", column.name(), present);
//!     }
//!
//!     # std::fs::remove_file("quick_start.edf").ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Digital values only
//!
//! Samples are the raw digital integers stored in the file. The calibration
//! fields (physical and digital minimum/maximum) are exposed in the metadata
//! for callers that want physical units; they are not applied here.
//!
//! ```rust
//! use edfframe::{EdfReader, FieldValue};
//!
//! # let bytes = edfframe::doctest_utils::two_channel_test_bytes();
//! let reader = EdfReader::from_bytes(&bytes)?;
//! let channel = &reader.channels()[1];
//!
//! // 多数文件存整数，也有文件存文本占位符
//! match &channel.physical_min {
//!     FieldValue::Numeric(n) => println!("physical min: {}", n),
//!     FieldValue::Text(t) => println!("physical min (text): {}", t),
//! }
//! # Ok::<(), edfframe::EdfError>(())
//! ```
//!
//! ## Start date century
//!
//! The start date carries a two-digit year. It is kept literally (`85` is
//! year 85); use [`RecordingHeader::start_with_century`] to pick a century.

pub mod config;
pub mod demux;
pub mod error;
pub mod field;
pub mod header;
pub mod metadata;
pub mod reader;
pub mod series;
pub mod signals;
pub mod table;
pub mod types;

#[doc(hidden)]
pub mod doctest_utils; // For doctest and integration test support

// Re-export main types for convenience
pub use config::{AnnotationMode, DecodeOptions};
pub use error::{EdfError, Result};
pub use metadata::{Metadata, MetadataValue};
pub use reader::{read_edf, AnnotationChannel, EdfReader};
pub use series::{TimeOffset, TimeSeries};
pub use table::{Column, SignalTable};
pub use types::{ChannelDescriptor, FieldValue, OpaqueRegion, RecordingHeader};

// Format constants
pub const HEADER_BASE_BYTES: usize = 256;
pub const CHANNEL_HEADER_BYTES: usize = 256;
pub const CHANNEL_RESERVED_BYTES: usize = 32;
pub const SAMPLE_BYTES: usize = 2;
pub const ANNOTATIONS_LABEL: &str = "EDF Annotations";

/// Library version
///
/// ```rust
/// let version = edfframe::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
