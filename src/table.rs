//! The decoded, time-indexed table.

use chrono::NaiveDateTime;

use crate::metadata::Metadata;
use crate::series::{TimeOffset, TimeSeries};
use crate::types::{ChannelDescriptor, RecordingHeader};

/// One named column of a [`SignalTable`].
///
/// `None` marks a row where this channel has no sample, which happens when
/// channels are recorded at different rates.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Option<i32>>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<i32>] {
        &self.values
    }

    /// Present samples only, in row order
    pub fn samples(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.iter().flatten().copied()
    }
}

/// Channels outer-joined on time, with the recording metadata attached.
///
/// Rows are the sorted union of every channel's sample times. Columns follow
/// channel order and are named after channel labels; labels are not made
/// unique, so two channels called `"EEG"` give two columns called `"EEG"`.
///
/// # Examples
///
/// ```rust
/// use edfframe::EdfReader;
///
/// # let bytes = edfframe::doctest_utils::two_channel_test_bytes();
/// let table = EdfReader::from_bytes(&bytes)?.into_table();
///
/// // A: 4 samples/record, B: 2 samples/record, 2 records of 1000 ms
/// assert_eq!(table.height(), 8);
/// assert_eq!(table.column_names(), vec!["A", "B"]);
///
/// let b = table.column("B").unwrap();
/// assert_eq!(b.values()[0], Some(100));
/// assert_eq!(b.values()[1], None); // 250 ms: B has no sample here
/// assert_eq!(b.values()[2], Some(101));
///
/// println!("recorded by: {}", table.metadata().header().patient_id);
/// # Ok::<(), edfframe::EdfError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SignalTable {
    start: NaiveDateTime,
    index: Vec<TimeOffset>,
    columns: Vec<Column>,
    metadata: Metadata,
}

impl SignalTable {
    /// Outer-joins `series` on their sample times.
    pub fn from_series(start: NaiveDateTime, series: &[TimeSeries], metadata: Metadata) -> Self {
        let mut index: Vec<TimeOffset> = series.iter().flat_map(|s| s.offsets()).collect();
        index.sort_unstable();
        index.dedup();

        let columns = series
            .iter()
            .map(|s| {
                let mut values = vec![None; index.len()];
                // 各序列自身有序，沿索引单向推进即可
                let mut row = 0;
                for (offset, &sample) in s.offsets().zip(s.samples()) {
                    while index[row] < offset {
                        row += 1;
                    }
                    values[row] = Some(sample);
                }
                Column {
                    name: s.label().to_string(),
                    values,
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "assembled table: {} rows x {} columns",
            index.len(),
            columns.len()
        );

        SignalTable {
            start,
            index,
            columns,
            metadata,
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Row offsets from the recording start, strictly increasing
    pub fn index(&self) -> &[TimeOffset] {
        &self.index
    }

    /// Row timestamps, strictly increasing.
    ///
    /// Like [`TimeSeries::timestamps`], stops at the first row whose time is
    /// not representable.
    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.index
            .iter()
            .map_while(move |offset| offset.after(self.start))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// First column called `name`
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Every column called `name`, in channel order
    pub fn columns_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Column> + 'a {
        self.columns.iter().filter(move |c| c.name == name)
    }

    /// Cell at `row` of the column at position `column`
    pub fn get(&self, row: usize, column: usize) -> Option<i32> {
        self.columns.get(column)?.values.get(row).copied().flatten()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn into_parts(self) -> (Vec<Column>, Metadata) {
        (self.columns, self.metadata)
    }
}

/// Builds one time series per channel and joins them into a table.
///
/// `raw_samples[i]` is channel `i`'s demultiplexed stream. Samples are
/// widened to `i32` and are not scaled.
pub fn assemble(
    header: &RecordingHeader,
    channels: &[ChannelDescriptor],
    raw_samples: &[Vec<i16>],
) -> SignalTable {
    let series: Vec<TimeSeries> = channels
        .iter()
        .zip(raw_samples)
        .map(|(channel, samples)| to_series(header, channel, samples))
        .collect();

    let metadata = Metadata::new(header.clone(), channels.to_vec());
    SignalTable::from_series(header.start, &series, metadata)
}

pub(crate) fn to_series(
    header: &RecordingHeader,
    channel: &ChannelDescriptor,
    samples: &[i16],
) -> TimeSeries {
    TimeSeries::new(
        channel.label.clone(),
        header.start,
        header.record_duration_ms.max(0) as u64,
        channel.n_samples_per_record,
        samples.iter().map(|&s| s as i32).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, OpaqueRegion};
    use chrono::{NaiveDate, TimeDelta};
    use pretty_assertions::assert_eq;

    fn header(n_data_records: i64, record_duration_ms: i64, n_channels: i64) -> RecordingHeader {
        RecordingHeader {
            version: 0,
            patient_id: "John Doe".to_string(),
            recording_id: String::new(),
            start: NaiveDate::from_ymd_opt(85, 1, 2)
                .unwrap()
                .and_hms_opt(13, 45, 30)
                .unwrap(),
            header_bytes: 256 + 256 * n_channels,
            reserved: OpaqueRegion::default(),
            n_data_records,
            record_duration_ms,
            n_channels,
        }
    }

    fn channel(label: &str, n_samples_per_record: usize) -> ChannelDescriptor {
        ChannelDescriptor {
            label: label.to_string(),
            transducer: String::new(),
            dimension: "uV".to_string(),
            physical_min: FieldValue::Numeric(-100),
            physical_max: FieldValue::Numeric(100),
            digital_min: FieldValue::Numeric(-32768),
            digital_max: FieldValue::Numeric(32767),
            prefilter: String::new(),
            n_samples_per_record,
            reserved: OpaqueRegion::default(),
        }
    }

    #[test]
    fn test_outer_join_different_rates() {
        let h = header(2, 1000, 2);
        let channels = [channel("A", 4), channel("B", 2)];
        let raw = vec![(0..8).collect::<Vec<i16>>(), vec![100, 101, 102, 103]];

        let table = assemble(&h, &channels, &raw);
        assert_eq!(table.height(), 8);
        assert_eq!(table.width(), 2);

        let a: Vec<_> = table.column("A").unwrap().values().to_vec();
        assert_eq!(a, (0..8).map(Some).collect::<Vec<_>>());

        let b: Vec<_> = table.column("B").unwrap().values().to_vec();
        assert_eq!(
            b,
            vec![Some(100), None, Some(101), None, Some(102), None, Some(103), None]
        );

        let timestamps: Vec<_> = table.timestamps().collect();
        assert_eq!(timestamps[0], h.start);
        assert_eq!(timestamps[7], h.start + TimeDelta::milliseconds(1750));
    }

    #[test]
    fn test_zero_is_not_missing() {
        let h = header(1, 1000, 2);
        let channels = [channel("A", 2), channel("B", 1)];
        let raw = vec![vec![0, 0], vec![0]];

        let table = assemble(&h, &channels, &raw);
        assert_eq!(table.get(0, 1), Some(0));
        assert_eq!(table.get(1, 1), None);
        assert_eq!(table.column("B").unwrap().samples().count(), 1);
    }

    #[test]
    fn test_non_nested_rates() {
        // 3 与 2 样本/记录：行索引为两者时间点的并集
        let h = header(1, 1000, 2);
        let channels = [channel("A", 3), channel("B", 2)];
        let raw = vec![vec![1, 2, 3], vec![10, 20]];

        let table = assemble(&h, &channels, &raw);
        assert_eq!(
            table.index(),
            &[
                TimeOffset::ZERO,
                TimeOffset::from_millis_ratio(1000, 3),
                TimeOffset::from_millis(500),
                TimeOffset::from_millis_ratio(2000, 3),
            ]
        );
        assert_eq!(
            table.column("A").unwrap().values(),
            &[Some(1), Some(2), None, Some(3)]
        );
        assert_eq!(
            table.column("B").unwrap().values(),
            &[Some(10), None, Some(20), None]
        );
    }

    #[test]
    fn test_duplicate_labels_kept() {
        let h = header(1, 1000, 2);
        let channels = [channel("EEG", 1), channel("EEG", 1)];
        let raw = vec![vec![1], vec![2]];

        let table = assemble(&h, &channels, &raw);
        assert_eq!(table.column_names(), vec!["EEG", "EEG"]);
        assert_eq!(table.column("EEG").unwrap().values(), &[Some(1)]);
        let all: Vec<_> = table.columns_named("EEG").map(|c| c.values()[0]).collect();
        assert_eq!(all, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_metadata_attached() {
        let h = header(1, 1000, 1);
        let channels = [channel("A", 1)];
        let table = assemble(&h, &channels, &[vec![5]]);

        assert_eq!(table.metadata().header(), &h);
        assert_eq!(table.metadata().channels(), &channels);

        let (columns, metadata) = table.into_parts();
        assert_eq!(columns.len(), 1);
        assert_eq!(metadata.header().patient_id, "John Doe");
    }

    #[test]
    fn test_widened_extremes() {
        let h = header(1, 1000, 1);
        let table = assemble(&h, &[channel("A", 2)], &[vec![i16::MIN, i16::MAX]]);
        assert_eq!(
            table.column("A").unwrap().values(),
            &[Some(-32768), Some(32767)]
        );
    }
}
