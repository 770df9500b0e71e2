use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::{ANNOTATIONS_LABEL, CHANNEL_HEADER_BYTES, HEADER_BASE_BYTES};

/// A fixed-width header value that is an integer when it parses as one and
/// trimmed text otherwise.
///
/// Calibration fields (physical/digital minimum and maximum) are stored as
/// ASCII in the file. Most recordings put integers there, some put textual
/// placeholders or decimals; both are kept without coercion.
///
/// ```rust
/// use edfframe::FieldValue;
///
/// let min = FieldValue::Numeric(-100);
/// assert_eq!(min.as_int(), Some(-100));
/// assert_eq!(min.to_string(), "-100");
///
/// let unknown = FieldValue::Text("Unknown".to_string());
/// assert_eq!(unknown.as_int(), None);
/// assert_eq!(unknown.as_text(), Some("Unknown"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Numeric(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Numeric(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Numeric(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }

    /// 数值形式；文本字段尝试按浮点数解析（例如 "-100.5"）
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric(n) => Some(*n as f64),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Numeric(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Bytes carried through the decoder without interpretation.
///
/// Used for the reserved header areas and, in
/// [`AnnotationMode::PassThrough`](crate::AnnotationMode::PassThrough), for
/// the annotation channel's data.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct OpaqueRegion(Vec<u8>);

impl OpaqueRegion {
    pub fn new(bytes: Vec<u8>) -> Self {
        OpaqueRegion(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for OpaqueRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueRegion({} bytes)", self.0.len())
    }
}

impl From<&[u8]> for OpaqueRegion {
    fn from(bytes: &[u8]) -> Self {
        OpaqueRegion(bytes.to_vec())
    }
}

/// The fixed 256-byte recording header.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingHeader {
    pub version: i64,
    pub patient_id: String,
    pub recording_id: String,
    /// Recording start. The file stores a two-digit year which is kept
    /// literally: `"85"` becomes year 85, not 1985. See
    /// [`RecordingHeader::start_with_century`].
    pub start: NaiveDateTime,
    /// Declared size of the header plus the channel table
    pub header_bytes: i64,
    pub reserved: OpaqueRegion,
    pub n_data_records: i64,
    /// Duration of one data record in milliseconds
    pub record_duration_ms: i64,
    pub n_channels: i64,
}

impl RecordingHeader {
    /// Header size implied by the channel count: 256 bytes plus 256 per channel.
    pub fn expected_header_bytes(&self) -> i64 {
        HEADER_BASE_BYTES as i64 + CHANNEL_HEADER_BYTES as i64 * self.n_channels
    }

    /// Places the literal two-digit start year into a caller-chosen century.
    ///
    /// The format cannot tell 1985 from 2085, so the decoder never guesses.
    /// Returns `None` if the resulting date does not exist (29 February in a
    /// non-leap year).
    ///
    /// ```rust
    /// use edfframe::EdfReader;
    /// use chrono::Datelike;
    ///
    /// let bytes = edfframe::doctest_utils::two_channel_test_bytes();
    /// let reader = EdfReader::from_bytes(&bytes)?;
    ///
    /// // 文件中的年份为 "85"
    /// assert_eq!(reader.header().start.year(), 85);
    /// let resolved = reader.header().start_with_century(1900).unwrap();
    /// assert_eq!(resolved.year(), 1985);
    /// # Ok::<(), edfframe::EdfError>(())
    /// ```
    pub fn start_with_century(&self, century: i32) -> Option<NaiveDateTime> {
        let date = self.start.date();
        let resolved = NaiveDate::from_ymd_opt(century + date.year(), date.month(), date.day())?;
        Some(resolved.and_time(self.start.time()))
    }
}

/// Metadata for one recorded channel.
///
/// The position of a descriptor in the channel list is the channel's
/// identity: it fixes both where its fields sit in the channel table and
/// where its samples sit inside each data record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub label: String,
    pub transducer: String,
    pub dimension: String,
    pub physical_min: FieldValue,
    pub physical_max: FieldValue,
    pub digital_min: FieldValue,
    pub digital_max: FieldValue,
    pub prefilter: String,
    /// Samples of this channel within one data record
    pub n_samples_per_record: usize,
    pub reserved: OpaqueRegion,
}

impl ChannelDescriptor {
    /// Whether this is the EDF+ annotation channel
    pub fn is_annotations(&self) -> bool {
        self.label == ANNOTATIONS_LABEL
    }

    /// Samples of this channel across the whole file
    pub fn samples_in_file(&self, n_data_records: usize) -> usize {
        self.n_samples_per_record * n_data_records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn header_starting(date: NaiveDate) -> RecordingHeader {
        RecordingHeader {
            version: 0,
            patient_id: String::new(),
            recording_id: String::new(),
            start: date.and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            header_bytes: 768,
            reserved: OpaqueRegion::default(),
            n_data_records: 1,
            record_duration_ms: 1000,
            n_channels: 2,
        }
    }

    #[test]
    fn test_expected_header_bytes() {
        let header = header_starting(NaiveDate::from_ymd_opt(85, 1, 2).unwrap());
        assert_eq!(header.expected_header_bytes(), 768);
    }

    #[test]
    fn test_start_with_century() {
        let header = header_starting(NaiveDate::from_ymd_opt(4, 2, 29).unwrap());
        let resolved = header.start_with_century(2000).unwrap();
        assert_eq!(resolved.year(), 2004);

        // "00" 年是闰年（公历外推），1900 年不是
        let header = header_starting(NaiveDate::from_ymd_opt(0, 2, 29).unwrap());
        assert!(header.start_with_century(1900).is_none());
        assert!(header.start_with_century(2000).is_some());
    }

    #[test]
    fn test_field_value_to_f64() {
        assert_eq!(FieldValue::Numeric(-100).to_f64(), Some(-100.0));
        assert_eq!(FieldValue::Text("-100.5".to_string()).to_f64(), Some(-100.5));
        assert_eq!(FieldValue::Text("Unknown".to_string()).to_f64(), None);
    }

    #[test]
    fn test_annotation_label() {
        let channel = ChannelDescriptor {
            label: ANNOTATIONS_LABEL.to_string(),
            transducer: String::new(),
            dimension: String::new(),
            physical_min: FieldValue::Numeric(-1),
            physical_max: FieldValue::Numeric(1),
            digital_min: FieldValue::Numeric(-32768),
            digital_max: FieldValue::Numeric(32767),
            prefilter: String::new(),
            n_samples_per_record: 60,
            reserved: OpaqueRegion::default(),
        };
        assert!(channel.is_annotations());
        assert_eq!(channel.samples_in_file(3), 180);
    }
}
