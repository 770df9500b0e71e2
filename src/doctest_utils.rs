// Internal utilities for documentation tests and integration tests
// Builds synthetic EDF byte images with the exact on-disk layout

use crate::demux::{interleave, RecordLayout};
use crate::{Result, CHANNEL_RESERVED_BYTES, HEADER_BASE_BYTES};
use std::path::Path;

/// Channel table entry for [`EdfBuilder`]. Numeric fields are given as the
/// text that ends up in the file so that non-integer content can be written.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    label: String,
    transducer: String,
    dimension: String,
    physical_min: String,
    physical_max: String,
    digital_min: String,
    digital_max: String,
    prefilter: String,
    n_samples_per_record: usize,
    samples_field: Option<String>,
}

impl ChannelSpec {
    pub fn new(label: &str, n_samples_per_record: usize) -> Self {
        ChannelSpec {
            label: label.to_string(),
            transducer: String::new(),
            dimension: String::new(),
            physical_min: "-100".to_string(),
            physical_max: "100".to_string(),
            digital_min: "-32768".to_string(),
            digital_max: "32767".to_string(),
            prefilter: String::new(),
            n_samples_per_record,
            samples_field: None,
        }
    }

    pub fn transducer(mut self, transducer: &str) -> Self {
        self.transducer = transducer.to_string();
        self
    }

    pub fn dimension(mut self, dimension: &str) -> Self {
        self.dimension = dimension.to_string();
        self
    }

    pub fn physical_range(mut self, min: &str, max: &str) -> Self {
        self.physical_min = min.to_string();
        self.physical_max = max.to_string();
        self
    }

    pub fn digital_range(mut self, min: &str, max: &str) -> Self {
        self.digital_min = min.to_string();
        self.digital_max = max.to_string();
        self
    }

    pub fn prefilter(mut self, prefilter: &str) -> Self {
        self.prefilter = prefilter.to_string();
        self
    }

    /// Writes `text` into the samples-per-record field instead of the count
    pub fn samples_field(mut self, text: &str) -> Self {
        self.samples_field = Some(text.to_string());
        self
    }
}

/// Builder for in-memory EDF files.
///
/// Defaults: version 0, start `01.01.85 00.00.00`, 1000 ms records, no
/// channels. The record count is derived from the sample streams unless set.
#[derive(Debug, Clone)]
pub struct EdfBuilder {
    patient_id: String,
    recording_id: String,
    start_date: String,
    start_time: String,
    header_bytes: Option<i64>,
    n_data_records: Option<i64>,
    record_duration_ms: i64,
    channels: Vec<ChannelSpec>,
    samples: Vec<Vec<i16>>,
}

impl Default for EdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EdfBuilder {
    pub fn new() -> Self {
        EdfBuilder {
            patient_id: String::new(),
            recording_id: String::new(),
            start_date: "01.01.85".to_string(),
            start_time: "00.00.00".to_string(),
            header_bytes: None,
            n_data_records: None,
            record_duration_ms: 1000,
            channels: Vec::new(),
            samples: Vec::new(),
        }
    }

    pub fn patient_id(mut self, patient_id: &str) -> Self {
        self.patient_id = patient_id.to_string();
        self
    }

    pub fn recording_id(mut self, recording_id: &str) -> Self {
        self.recording_id = recording_id.to_string();
        self
    }

    pub fn start(mut self, date: &str, time: &str) -> Self {
        self.start_date = date.to_string();
        self.start_time = time.to_string();
        self
    }

    /// Overrides the declared header size
    pub fn header_bytes(mut self, header_bytes: i64) -> Self {
        self.header_bytes = Some(header_bytes);
        self
    }

    /// Overrides the declared record count
    pub fn n_data_records(mut self, n_data_records: i64) -> Self {
        self.n_data_records = Some(n_data_records);
        self
    }

    pub fn record_duration_ms(mut self, record_duration_ms: i64) -> Self {
        self.record_duration_ms = record_duration_ms;
        self
    }

    pub fn channel(self, label: &str, n_samples_per_record: usize) -> Self {
        self.channel_spec(ChannelSpec::new(label, n_samples_per_record))
    }

    pub fn channel_spec(mut self, spec: ChannelSpec) -> Self {
        self.channels.push(spec);
        self
    }

    /// Complete sample stream of every channel, in channel order
    pub fn samples(mut self, samples: Vec<Vec<i16>>) -> Self {
        self.samples = samples;
        self
    }

    fn derived_record_count(&self) -> usize {
        self.channels
            .iter()
            .zip(&self.samples)
            .filter(|(spec, _)| spec.n_samples_per_record > 0)
            .map(|(spec, stream)| stream.len().div_ceil(spec.n_samples_per_record))
            .max()
            .unwrap_or(0)
    }

    pub fn build(&self) -> Vec<u8> {
        let n = self.channels.len();
        let n_records = self.derived_record_count();
        let header_bytes = self
            .header_bytes
            .unwrap_or((HEADER_BASE_BYTES * (n + 1)) as i64);
        let declared_records = self.n_data_records.unwrap_or(n_records as i64);

        let mut out = Vec::new();
        push_field(&mut out, "0", 8);
        push_field(&mut out, &self.patient_id, 80);
        push_field(&mut out, &self.recording_id, 80);
        push_field(&mut out, &self.start_date, 8);
        push_field(&mut out, &self.start_time, 8);
        push_field(&mut out, &header_bytes.to_string(), 8);
        push_field(&mut out, "", 44);
        push_field(&mut out, &declared_records.to_string(), 8);
        push_field(&mut out, &self.record_duration_ms.to_string(), 8);
        push_field(&mut out, &n.to_string(), 4);

        // 通道表按字段顺序排列
        let columns: [(usize, fn(&ChannelSpec) -> String); 9] = [
            (16, |c| c.label.clone()),
            (80, |c| c.transducer.clone()),
            (8, |c| c.dimension.clone()),
            (8, |c| c.physical_min.clone()),
            (8, |c| c.physical_max.clone()),
            (8, |c| c.digital_min.clone()),
            (8, |c| c.digital_max.clone()),
            (80, |c| c.prefilter.clone()),
            (8, |c| {
                c.samples_field
                    .clone()
                    .unwrap_or_else(|| c.n_samples_per_record.to_string())
            }),
        ];
        for (width, value) in columns {
            for channel in &self.channels {
                push_field(&mut out, &value(channel), width);
            }
        }
        push_field(&mut out, "", CHANNEL_RESERVED_BYTES * n);

        let counts: Vec<usize> = self.channels.iter().map(|c| c.n_samples_per_record).collect();
        // 样本数无法寻址时只写头部
        if let Ok(layout) = RecordLayout::new(&counts) {
            out.extend(interleave(&self.samples, &layout, n_records));
        }
        out
    }
}

/// 右侧补空格到固定宽度，超长截断
fn push_field(out: &mut Vec<u8>, value: &str, width: usize) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(width);
    out.extend_from_slice(&bytes[..len]);
    out.resize(out.len() + width - len, b' ');
}

/// Two channels over two 1000 ms records, patient `John Doe`, start
/// `02.01.85 13.45.30`: `A` has 4 samples per record (values 0..8), `B` has
/// 2 samples per record (values 100..104).
pub fn two_channel_test_bytes() -> Vec<u8> {
    EdfBuilder::new()
        .patient_id("John Doe")
        .recording_id("Startdate 02-JAN-1985 X X X")
        .start("02.01.85", "13.45.30")
        .record_duration_ms(1000)
        .channel_spec(ChannelSpec::new("A", 4).dimension("uV").transducer("AgAgCl electrode"))
        .channel_spec(ChannelSpec::new("B", 2).dimension("mV").physical_range("-5", "5"))
        .samples(vec![(0..8).collect(), (100..104).collect()])
        .build()
}

/// Writes [`two_channel_test_bytes`] to `path`
pub fn create_two_channel_test_file<P: AsRef<Path>>(path: P) -> Result<()> {
    std::fs::write(path, two_channel_test_bytes())?;
    Ok(())
}
