use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::types::{ChannelDescriptor, FieldValue, RecordingHeader};

/// A single entry of [`Metadata::to_map`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Int(i64),
    Text(String),
    Timestamp(NaiveDateTime),
    IntList(Vec<i64>),
    TextList(Vec<String>),
    FieldList(Vec<FieldValue>),
}

/// Recording header and channel descriptors attached to a decoded table.
///
/// Read-only once built: the table hands out references only.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    header: RecordingHeader,
    channels: Vec<ChannelDescriptor>,
}

impl Metadata {
    pub fn new(header: RecordingHeader, channels: Vec<ChannelDescriptor>) -> Self {
        Metadata { header, channels }
    }

    pub fn header(&self) -> &RecordingHeader {
        &self.header
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    /// Flattens header and channel fields into a keyed map.
    ///
    /// Channel fields become parallel lists in channel order, one entry per
    /// channel, under `signal_*` keys.
    ///
    /// ```rust
    /// use edfframe::{EdfReader, MetadataValue};
    ///
    /// let bytes = edfframe::doctest_utils::two_channel_test_bytes();
    /// let reader = EdfReader::from_bytes(&bytes)?;
    /// let map = reader.metadata().to_map();
    ///
    /// assert_eq!(map.len(), 17);
    /// assert_eq!(map["n_channels"], MetadataValue::Int(2));
    /// assert_eq!(map["signal_n_samples"], MetadataValue::IntList(vec![4, 2]));
    /// # Ok::<(), edfframe::EdfError>(())
    /// ```
    pub fn to_map(&self) -> BTreeMap<&'static str, MetadataValue> {
        let header = &self.header;
        let texts = |f: &dyn Fn(&ChannelDescriptor) -> String| {
            MetadataValue::TextList(self.channels.iter().map(f).collect())
        };
        let fields = |f: &dyn Fn(&ChannelDescriptor) -> FieldValue| {
            MetadataValue::FieldList(self.channels.iter().map(f).collect())
        };

        let mut map = BTreeMap::new();
        map.insert("version", MetadataValue::Int(header.version));
        map.insert("patient_id", MetadataValue::Text(header.patient_id.clone()));
        map.insert("recording_id", MetadataValue::Text(header.recording_id.clone()));
        map.insert("start", MetadataValue::Timestamp(header.start));
        map.insert("header_bytes", MetadataValue::Int(header.header_bytes));
        map.insert("n_data_records", MetadataValue::Int(header.n_data_records));
        map.insert("record_duration_ms", MetadataValue::Int(header.record_duration_ms));
        map.insert("n_channels", MetadataValue::Int(header.n_channels));
        map.insert("signal_labels", texts(&|c| c.label.clone()));
        map.insert("signal_transducers", texts(&|c| c.transducer.clone()));
        map.insert("signal_dimensions", texts(&|c| c.dimension.clone()));
        map.insert("signal_physical_minimums", fields(&|c| c.physical_min.clone()));
        map.insert("signal_physical_maximums", fields(&|c| c.physical_max.clone()));
        map.insert("signal_digital_minimums", fields(&|c| c.digital_min.clone()));
        map.insert("signal_digital_maximums", fields(&|c| c.digital_max.clone()));
        map.insert("signal_prefilters", texts(&|c| c.prefilter.clone()));
        map.insert(
            "signal_n_samples",
            MetadataValue::IntList(
                self.channels
                    .iter()
                    .map(|c| c.n_samples_per_record as i64)
                    .collect(),
            ),
        );
        map
    }
}
