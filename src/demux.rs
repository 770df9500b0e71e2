//! Record de-interleaving.
//!
//! A data record holds one burst per channel, back to back in channel order.
//! Reconstructing a channel means taking its window out of every record and
//! concatenating the windows in record order.

use crate::error::{EdfError, Result};
use crate::types::ChannelDescriptor;
use crate::SAMPLE_BYTES;

/// Sample positions of every channel inside one data record.
///
/// Built once per file. `record_stride` is the number of samples in a full
/// record and is the same for every channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    samples_per_record: Vec<usize>,
    /// 每个通道之前的样本数
    before: Vec<usize>,
    record_stride: usize,
}

impl RecordLayout {
    /// # Errors
    ///
    /// * `EdfError::LayoutOverflow` - One record's size in bytes does not fit
    ///   in `usize`
    pub fn new(samples_per_record: &[usize]) -> Result<Self> {
        let mut before = Vec::with_capacity(samples_per_record.len());
        let mut running = 0usize;
        for &n in samples_per_record {
            before.push(running);
            running = running.checked_add(n).ok_or_else(|| {
                EdfError::LayoutOverflow(format!(
                    "sum of samples per record exceeds {}",
                    usize::MAX
                ))
            })?;
        }
        // 保证 record_bytes 不溢出
        if running.checked_mul(SAMPLE_BYTES).is_none() {
            return Err(EdfError::LayoutOverflow(format!(
                "{} samples per record",
                running
            )));
        }

        Ok(RecordLayout {
            samples_per_record: samples_per_record.to_vec(),
            before,
            record_stride: running,
        })
    }

    pub fn from_channels(channels: &[ChannelDescriptor]) -> Result<Self> {
        let counts: Vec<usize> = channels.iter().map(|c| c.n_samples_per_record).collect();
        Self::new(&counts)
    }

    pub fn n_channels(&self) -> usize {
        self.samples_per_record.len()
    }

    /// Samples in one full data record, all channels included
    pub fn record_stride(&self) -> usize {
        self.record_stride
    }

    /// Bytes in one full data record
    pub fn record_bytes(&self) -> usize {
        self.record_stride * SAMPLE_BYTES
    }

    /// Bytes the sample region must hold for `n_data_records` records
    ///
    /// # Errors
    ///
    /// * `EdfError::LayoutOverflow` - The size does not fit in `usize`
    pub fn region_bytes(&self, n_data_records: usize) -> Result<usize> {
        self.record_bytes()
            .checked_mul(n_data_records)
            .ok_or_else(|| {
                EdfError::LayoutOverflow(format!(
                    "{} records of {} bytes",
                    n_data_records,
                    self.record_bytes()
                ))
            })
    }

    /// Byte range of `channel`'s window inside record `record`, relative to
    /// the start of the sample region.
    ///
    /// Only in bounds for records the region was checked to hold.
    pub fn window(&self, channel: usize, record: usize) -> std::ops::Range<usize> {
        let start = (self.before[channel] + record * self.record_stride) * SAMPLE_BYTES;
        start..start + self.samples_per_record[channel] * SAMPLE_BYTES
    }
}

fn check_region(region: &[u8], layout: &RecordLayout, n_data_records: usize) -> Result<()> {
    let expected = layout.region_bytes(n_data_records)?;
    if region.len() < expected {
        return Err(EdfError::TruncatedSampleRegion {
            expected,
            actual: region.len(),
        });
    }
    if region.len() > expected {
        log::warn!(
            "{} bytes after the last data record are ignored",
            region.len() - expected
        );
    }
    Ok(())
}

/// Concatenates `channel`'s windows across all records without decoding.
pub fn channel_bytes(
    region: &[u8],
    layout: &RecordLayout,
    channel: usize,
    n_data_records: usize,
) -> Result<Vec<u8>> {
    if channel >= layout.n_channels() {
        return Err(EdfError::InvalidSignalIndex(channel));
    }
    check_region(region, layout, n_data_records)?;

    let mut bytes =
        Vec::with_capacity(layout.samples_per_record[channel] * SAMPLE_BYTES * n_data_records);
    for record in 0..n_data_records {
        bytes.extend_from_slice(&region[layout.window(channel, record)]);
    }
    Ok(bytes)
}

/// Splits the record-interleaved sample region into one stream per channel.
///
/// Each stream holds `n_data_records * n_samples_per_record` raw digital
/// values, in time order. Values are not scaled to physical units.
///
/// # Errors
///
/// * `EdfError::TruncatedSampleRegion` - `region` is shorter than
///   `n_data_records` full records
/// * `EdfError::LayoutOverflow` - `n_data_records` full records would not
///   fit in `usize` bytes
///
/// # Examples
///
/// ```rust
/// use edfframe::demux::{demultiplex, RecordLayout};
///
/// // 两个记录：A 每记录 2 个样本，B 每记录 1 个样本
/// let region: Vec<u8> = [1i16, 2, 10, 3, 4, 20]
///     .iter()
///     .flat_map(|v| v.to_le_bytes())
///     .collect();
/// let layout = RecordLayout::new(&[2, 1])?;
///
/// let streams = demultiplex(&region, &layout, 2)?;
/// assert_eq!(streams, vec![vec![1, 2, 3, 4], vec![10, 20]]);
/// # Ok::<(), edfframe::EdfError>(())
/// ```
pub fn demultiplex(
    region: &[u8],
    layout: &RecordLayout,
    n_data_records: usize,
) -> Result<Vec<Vec<i16>>> {
    check_region(region, layout, n_data_records)?;

    log::debug!(
        "demultiplexing {} records of {} samples across {} channels",
        n_data_records,
        layout.record_stride(),
        layout.n_channels()
    );

    let streams = (0..layout.n_channels())
        .map(|channel| {
            let mut samples =
                Vec::with_capacity(layout.samples_per_record[channel] * n_data_records);
            for record in 0..n_data_records {
                let window = &region[layout.window(channel, record)];
                samples.extend(
                    window
                        .chunks_exact(SAMPLE_BYTES)
                        .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
                );
            }
            log::trace!("channel {}: {} samples", channel, samples.len());
            samples
        })
        .collect();

    Ok(streams)
}

/// Lays per-channel streams back out as record-interleaved bytes.
///
/// The inverse of [`demultiplex`]. A stream shorter than
/// `n_data_records * n_samples_per_record` is padded with zeros.
pub fn interleave(streams: &[Vec<i16>], layout: &RecordLayout, n_data_records: usize) -> Vec<u8> {
    let mut region = Vec::with_capacity(layout.region_bytes(n_data_records).unwrap_or(0));
    for record in 0..n_data_records {
        for (channel, &n) in layout.samples_per_record.iter().enumerate() {
            let stream = streams.get(channel).map(Vec::as_slice).unwrap_or(&[]);
            for k in 0..n {
                let value = stream.get(record * n + k).copied().unwrap_or(0);
                region.extend_from_slice(&value.to_le_bytes());
            }
        }
    }
    region
}
