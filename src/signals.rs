//! The per-channel signal table that follows the recording header.
//!
//! The table is stored field-major: all labels, then all transducers, and so
//! on, each field kind repeated once per channel before the next kind starts.

use crate::error::{EdfError, Result};
use crate::field;
use crate::types::{ChannelDescriptor, FieldValue, OpaqueRegion};
use crate::CHANNEL_RESERVED_BYTES;

/// 信号表中的字段种类
#[derive(Debug, Clone, Copy)]
enum SignalField {
    Label,
    Transducer,
    Dimension,
    PhysicalMin,
    PhysicalMax,
    DigitalMin,
    DigitalMax,
    Prefilter,
    SamplesPerRecord,
}

/// Field kinds in file order with their width in bytes
const SIGNAL_FIELDS: [(SignalField, &str, usize); 9] = [
    (SignalField::Label, "label", 16),
    (SignalField::Transducer, "transducer", 80),
    (SignalField::Dimension, "dimension", 8),
    (SignalField::PhysicalMin, "physical_min", 8),
    (SignalField::PhysicalMax, "physical_max", 8),
    (SignalField::DigitalMin, "digital_min", 8),
    (SignalField::DigitalMax, "digital_max", 8),
    (SignalField::Prefilter, "prefilter", 80),
    (SignalField::SamplesPerRecord, "n_samples_per_record", 8),
];

fn blank_descriptor() -> ChannelDescriptor {
    ChannelDescriptor {
        label: String::new(),
        transducer: String::new(),
        dimension: String::new(),
        physical_min: FieldValue::Text(String::new()),
        physical_max: FieldValue::Text(String::new()),
        digital_min: FieldValue::Text(String::new()),
        digital_max: FieldValue::Text(String::new()),
        prefilter: String::new(),
        n_samples_per_record: 0,
        reserved: OpaqueRegion::default(),
    }
}

/// Parses `n_channels` channel descriptors starting at `start_offset`.
///
/// Returns the descriptors in channel order and the offset just past the
/// reserved block, which is where the sample data begins.
///
/// # Errors
///
/// * `EdfError::TruncatedChannelTable` - The buffer ends inside the table
/// * `EdfError::InvalidField` - A field is not valid text, or a
///   samples-per-record value is not a non-negative integer
pub fn parse_signals(
    buf: &[u8],
    start_offset: usize,
    n_channels: usize,
) -> Result<(Vec<ChannelDescriptor>, usize)> {
    let mut channels = vec![blank_descriptor(); n_channels];
    let mut cursor = start_offset;

    // 按字段优先顺序：每种字段先遍历全部通道，再进入下一种字段
    for (kind, name, width) in SIGNAL_FIELDS {
        ensure_available(buf, name, cursor, width * n_channels)?;

        for (index, channel) in channels.iter_mut().enumerate() {
            let offset = cursor + index * width;
            match kind {
                SignalField::Label => channel.label = field::read_text(buf, name, offset, width)?,
                SignalField::Transducer => {
                    channel.transducer = field::read_text(buf, name, offset, width)?
                }
                SignalField::Dimension => {
                    channel.dimension = field::read_text(buf, name, offset, width)?
                }
                SignalField::PhysicalMin => {
                    channel.physical_min = field::read_named(buf, name, offset, width)?
                }
                SignalField::PhysicalMax => {
                    channel.physical_max = field::read_named(buf, name, offset, width)?
                }
                SignalField::DigitalMin => {
                    channel.digital_min = field::read_named(buf, name, offset, width)?
                }
                SignalField::DigitalMax => {
                    channel.digital_max = field::read_named(buf, name, offset, width)?
                }
                SignalField::Prefilter => {
                    channel.prefilter = field::read_text(buf, name, offset, width)?
                }
                SignalField::SamplesPerRecord => {
                    channel.n_samples_per_record = read_sample_count(buf, name, offset, width)?
                }
            }
        }

        cursor += width * n_channels;
    }

    // 每个通道 32 字节保留区，不解析
    ensure_available(buf, "reserved", cursor, CHANNEL_RESERVED_BYTES * n_channels)?;
    for (index, channel) in channels.iter_mut().enumerate() {
        let start = cursor + index * CHANNEL_RESERVED_BYTES;
        channel.reserved = OpaqueRegion::from(&buf[start..start + CHANNEL_RESERVED_BYTES]);
    }
    cursor += CHANNEL_RESERVED_BYTES * n_channels;

    log::trace!(
        "parsed {} channel descriptors, sample data at byte {}",
        channels.len(),
        cursor
    );

    Ok((channels, cursor))
}

fn ensure_available(buf: &[u8], field: &'static str, offset: usize, len: usize) -> Result<()> {
    let expected = offset + len;
    if buf.len() < expected {
        return Err(EdfError::TruncatedChannelTable {
            field,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

fn read_sample_count(buf: &[u8], name: &str, offset: usize, width: usize) -> Result<usize> {
    let value = field::read_int(buf, name, offset, width)?;
    usize::try_from(value).map_err(|_| EdfError::InvalidField {
        field: name.to_string(),
        offset,
        reason: format!("negative sample count {}", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{ChannelSpec, EdfBuilder};
    use pretty_assertions::assert_eq;

    fn two_channel_bytes() -> Vec<u8> {
        EdfBuilder::new()
            .channel_spec(
                ChannelSpec::new("EEG Fpz-Cz", 4)
                    .transducer("Ag-AgCl electrodes")
                    .dimension("uV")
                    .physical_range("-100", "Unknown")
                    .prefilter("HP:0.5Hz"),
            )
            .channel_spec(ChannelSpec::new("Marker", 2).digital_range("0", "1000"))
            .samples(vec![vec![0; 8], vec![0; 4]])
            .build()
    }

    #[test]
    fn test_parse_two_channels() {
        let bytes = two_channel_bytes();
        let (channels, next) = parse_signals(&bytes, 256, 2).unwrap();

        assert_eq!(next, 256 + 2 * 256);
        assert_eq!(channels.len(), 2);

        let eeg = &channels[0];
        assert_eq!(eeg.label, "EEG Fpz-Cz");
        assert_eq!(eeg.transducer, "Ag-AgCl electrodes");
        assert_eq!(eeg.dimension, "uV");
        assert_eq!(eeg.physical_min, FieldValue::Numeric(-100));
        assert_eq!(eeg.physical_max, FieldValue::Text("Unknown".to_string()));
        assert_eq!(eeg.prefilter, "HP:0.5Hz");
        assert_eq!(eeg.n_samples_per_record, 4);
        assert_eq!(eeg.reserved.len(), 32);

        let marker = &channels[1];
        assert_eq!(marker.label, "Marker");
        assert_eq!(marker.digital_min, FieldValue::Numeric(0));
        assert_eq!(marker.digital_max, FieldValue::Numeric(1000));
        assert_eq!(marker.n_samples_per_record, 2);
    }

    #[test]
    fn test_field_major_layout() {
        // 第二个通道的标签紧跟第一个标签，而不是在第一个通道全部字段之后
        let bytes = two_channel_bytes();
        assert_eq!(&bytes[256 + 16..256 + 22], b"Marker");
        let (channels, _) = parse_signals(&bytes, 256, 2).unwrap();
        assert_eq!(channels[1].label, "Marker");
    }

    #[test]
    fn test_zero_channels() {
        let bytes = EdfBuilder::new().build();
        let (channels, next) = parse_signals(&bytes, 256, 0).unwrap();
        assert!(channels.is_empty());
        assert_eq!(next, 256);
    }

    #[test]
    fn test_truncated_mid_field() {
        let bytes = two_channel_bytes();
        // 截断在 prefilter 区域内
        let cut = 256 + 2 * (16 + 80 + 8 + 8 + 8 + 8 + 8) + 10;
        let err = parse_signals(&bytes[..cut], 256, 2).unwrap_err();
        match err {
            EdfError::TruncatedChannelTable { field, actual, .. } => {
                assert_eq!(field, "prefilter");
                assert_eq!(actual, cut);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_reserved_block() {
        let bytes = two_channel_bytes();
        let err = parse_signals(&bytes[..256 + 2 * 256 - 1], 256, 2).unwrap_err();
        assert!(matches!(
            err,
            EdfError::TruncatedChannelTable { field: "reserved", .. }
        ));
    }

    #[test]
    fn test_invalid_sample_count() {
        let bytes = EdfBuilder::new()
            .channel_spec(ChannelSpec::new("EEG", 0).samples_field("many"))
            .build();
        let err = parse_signals(&bytes, 256, 1).unwrap_err();
        assert!(matches!(err, EdfError::InvalidField { .. }));

        let bytes = EdfBuilder::new()
            .channel_spec(ChannelSpec::new("EEG", 0).samples_field("-4"))
            .build();
        let err = parse_signals(&bytes, 256, 1).unwrap_err();
        assert!(matches!(err, EdfError::InvalidField { .. }));
    }
}
