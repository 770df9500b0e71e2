use std::fs;
use std::io;
use std::path::Path;

use crate::config::{AnnotationMode, DecodeOptions};
use crate::demux::{self, RecordLayout};
use crate::error::{EdfError, Result};
use crate::header::parse_header;
use crate::metadata::Metadata;
use crate::series::{TimeOffset, TimeSeries};
use crate::signals::parse_signals;
use crate::table::{self, SignalTable};
use crate::types::{ChannelDescriptor, OpaqueRegion, RecordingHeader};
use crate::HEADER_BASE_BYTES;

/// Undecoded data of an annotation channel kept in
/// [`AnnotationMode::PassThrough`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationChannel {
    /// Position of the channel in the channel table
    pub index: usize,
    /// The channel's windows from every data record, concatenated
    pub data: OpaqueRegion,
}

/// Decoded EDF recording.
///
/// The whole file is decoded up front: header, channel table and the
/// per-channel sample streams. The input bytes are not kept.
///
/// # Examples
///
/// ## Decoding a file
///
/// ```rust
/// use edfframe::EdfReader;
///
/// # // Generate test file (hidden from docs)
/// # edfframe::doctest_utils::create_two_channel_test_file("recording.edf")?;
/// #
/// let reader = EdfReader::open("recording.edf")?;
///
/// let header = reader.header();
/// println!("Patient: {}", header.patient_id);
/// println!("Records: {} x {} ms", header.n_data_records, header.record_duration_ms);
///
/// for (i, channel) in reader.channels().iter().enumerate() {
///     let samples = reader.digital_samples(i)?;
///     println!("{}: {} samples ({})", channel.label, samples.len(), channel.dimension);
/// }
///
/// # // Cleanup (hidden from docs)
/// # std::fs::remove_file("recording.edf").ok();
/// # Ok::<(), edfframe::EdfError>(())
/// ```
///
/// ## Building the table
///
/// ```rust
/// use edfframe::EdfReader;
///
/// # let bytes = edfframe::doctest_utils::two_channel_test_bytes();
/// let table = EdfReader::from_bytes(&bytes)?.into_table();
///
/// for (timestamp, value) in table.timestamps().zip(table.columns()[1].values()) {
///     match value {
///         Some(v) => println!("{} {}", timestamp, v),
///         None => println!("{} -", timestamp),
///     }
/// }
/// # Ok::<(), edfframe::EdfError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EdfReader {
    metadata: Metadata,
    /// 每个通道的原始数字样本（透传的注释通道为空）
    samples: Vec<Vec<i16>>,
    annotations: Vec<AnnotationChannel>,
    options: DecodeOptions,
}

impl EdfReader {
    /// Reads and decodes an EDF file with default options.
    ///
    /// The file is read completely and closed before decoding starts.
    ///
    /// # Errors
    ///
    /// * `EdfError::FileNotFound` - The file does not exist
    /// * `EdfError::Io` - Any other read failure
    /// * Any decoding error from [`EdfReader::from_bytes`]
    ///
    /// ```rust
    /// match edfframe::EdfReader::open("nonexistent.edf") {
    ///     Err(edfframe::EdfError::FileNotFound(msg)) => println!("File not found: {}", msg),
    ///     other => panic!("unexpected: {:?}", other.map(|_| ())),
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, DecodeOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                EdfError::FileNotFound(format!("{}: {}", path.display(), e))
            }
            _ => EdfError::Io(e),
        })?;

        log::debug!("read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes_with(&bytes, options)
    }

    /// Decodes an in-memory EDF image with default options.
    ///
    /// # Errors
    ///
    /// * `EdfError::TruncatedHeader` - Fewer than 256 bytes
    /// * `EdfError::BadTimestamp` - Start date/time is malformed
    /// * `EdfError::InconsistentHeaderSize` - Declared header size does not
    ///   match the channel count
    /// * `EdfError::TruncatedChannelTable` - The channel table is cut short
    /// * `EdfError::TruncatedSampleRegion` - Fewer sample bytes than the
    ///   record count requires
    /// * `EdfError::InvalidField` - A numeric field holds something else
    /// * `EdfError::LayoutOverflow` - The declared sample counts do not fit
    ///   in memory addressing
    /// * `EdfError::RecordingTooLong` - The end of the last record is past
    ///   the representable time range
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, DecodeOptions::default())
    }

    pub fn from_bytes_with(bytes: &[u8], options: DecodeOptions) -> Result<Self> {
        let header = parse_header(bytes)?;
        log::debug!(
            "EDF header: version {}, {} channels, {} records of {} ms, start {}",
            header.version,
            header.n_channels,
            header.n_data_records,
            header.record_duration_ms,
            header.start
        );

        if options.validates_header_size()
            && header.header_bytes != header.expected_header_bytes()
        {
            return Err(EdfError::InconsistentHeaderSize {
                declared: header.header_bytes,
                computed: header.expected_header_bytes(),
            });
        }

        let n_channels = usize::try_from(header.n_channels)
            .map_err(|_| EdfError::InvalidSignalCount(header.n_channels))?;
        let n_data_records = usize::try_from(header.n_data_records)
            .map_err(|_| EdfError::InvalidRecordCount(header.n_data_records))?;

        let (channels, data_offset) = parse_signals(bytes, HEADER_BASE_BYTES, n_channels)?;

        let layout = RecordLayout::from_channels(&channels)?;
        if header.record_duration_ms == 0 && layout.record_stride() > 0 && n_data_records > 0 {
            // 样本间隔为零，时间索引无法严格递增
            return Err(EdfError::InvalidRecordDuration(header.record_duration_ms));
        }
        check_time_range(&header)?;

        let region = &bytes[data_offset..];
        let mut samples = demux::demultiplex(region, &layout, n_data_records)?;

        let mut annotations = Vec::new();
        if options.annotation_mode() == AnnotationMode::PassThrough {
            for (index, channel) in channels.iter().enumerate() {
                if channel.is_annotations() {
                    let data = demux::channel_bytes(region, &layout, index, n_data_records)?;
                    samples[index] = Vec::new();
                    annotations.push(AnnotationChannel {
                        index,
                        data: OpaqueRegion::new(data),
                    });
                }
            }
            log::trace!("passing through {} annotation channel(s)", annotations.len());
        }

        Ok(EdfReader {
            metadata: Metadata::new(header, channels),
            samples,
            annotations,
            options,
        })
    }

    pub fn header(&self) -> &RecordingHeader {
        self.metadata.header()
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        self.metadata.channels()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Annotation channels kept undecoded; empty unless decoding with
    /// [`AnnotationMode::PassThrough`].
    pub fn annotations(&self) -> &[AnnotationChannel] {
        &self.annotations
    }

    fn is_passed_through(&self, signal: usize) -> bool {
        self.annotations.iter().any(|a| a.index == signal)
    }

    /// Raw digital samples of one channel, in time order.
    ///
    /// # Errors
    ///
    /// * `EdfError::InvalidSignalIndex` - No such channel
    pub fn digital_samples(&self, signal: usize) -> Result<&[i16]> {
        self.samples
            .get(signal)
            .map(Vec::as_slice)
            .ok_or(EdfError::InvalidSignalIndex(signal))
    }

    /// One channel as a time-indexed series.
    ///
    /// # Errors
    ///
    /// * `EdfError::InvalidSignalIndex` - No such channel, or the channel was
    ///   kept undecoded in [`AnnotationMode::PassThrough`]
    ///
    /// ```rust
    /// use edfframe::{EdfReader, TimeOffset};
    ///
    /// # let bytes = edfframe::doctest_utils::two_channel_test_bytes();
    /// let reader = EdfReader::from_bytes(&bytes)?;
    /// let series = reader.time_series(0)?;
    ///
    /// assert_eq!(series.len(), 8);
    /// assert_eq!(series.spacing(), Some(TimeOffset::from_millis(250)));
    /// # Ok::<(), edfframe::EdfError>(())
    /// ```
    pub fn time_series(&self, signal: usize) -> Result<TimeSeries> {
        let channel = self
            .channels()
            .get(signal)
            .filter(|_| !self.is_passed_through(signal))
            .ok_or(EdfError::InvalidSignalIndex(signal))?;
        Ok(table::to_series(self.header(), channel, self.digital_samples(signal)?))
    }

    /// Builds the outer-joined table without consuming the reader.
    pub fn table(&self) -> SignalTable {
        let series: Vec<TimeSeries> = self
            .channels()
            .iter()
            .zip(&self.samples)
            .enumerate()
            .filter(|(index, _)| !self.is_passed_through(*index))
            .map(|(_, (channel, samples))| table::to_series(self.header(), channel, samples))
            .collect();

        SignalTable::from_series(self.header().start, &series, self.metadata.clone())
    }

    pub fn into_table(self) -> SignalTable {
        if self.annotations.is_empty() {
            let (header, channels) = (self.metadata.header(), self.metadata.channels());
            return table::assemble(header, channels, &self.samples);
        }
        self.table()
    }
}

/// 最后一个记录的结束时刻必须可表示，之前所有样本的时间戳因此都可表示
fn check_time_range(header: &RecordingHeader) -> Result<()> {
    let too_long = || EdfError::RecordingTooLong {
        n_data_records: header.n_data_records,
        record_duration_ms: header.record_duration_ms,
    };
    let end_ms = u64::try_from(header.n_data_records)
        .ok()
        .zip(u64::try_from(header.record_duration_ms).ok())
        .and_then(|(records, duration)| records.checked_mul(duration))
        .ok_or_else(too_long)?;

    TimeOffset::from_millis(end_ms)
        .after(header.start)
        .map(|_| ())
        .ok_or_else(too_long)
}

/// Decodes an EDF file into a table and its metadata in one call.
///
/// ```rust
/// # edfframe::doctest_utils::create_two_channel_test_file("pair.edf")?;
/// let (table, metadata) = edfframe::read_edf("pair.edf")?;
/// assert_eq!(table.width(), metadata.channels().len());
/// # std::fs::remove_file("pair.edf").ok();
/// # Ok::<(), edfframe::EdfError>(())
/// ```
pub fn read_edf<P: AsRef<Path>>(path: P) -> Result<(SignalTable, Metadata)> {
    let table = EdfReader::open(path)?.into_table();
    let metadata = table.metadata().clone();
    Ok((table, metadata))
}
