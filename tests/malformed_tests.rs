use edfframe::doctest_utils::{two_channel_test_bytes, ChannelSpec, EdfBuilder};
use edfframe::{DecodeOptions, EdfError, EdfReader};

#[test]
fn test_sample_region_one_byte_short() {
    let bytes = two_channel_test_bytes();
    let err = EdfReader::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();

    match err {
        EdfError::TruncatedSampleRegion { expected, actual } => {
            assert_eq!(expected, 24);
            assert_eq!(actual, 23);
        }
        other => panic!("expected TruncatedSampleRegion, got {other}"),
    }
}

#[test]
fn test_record_count_larger_than_data() {
    let bytes = EdfBuilder::new()
        .channel("EEG", 2)
        .samples(vec![vec![1, 2, 3, 4]])
        .n_data_records(3)
        .build();
    assert!(matches!(
        EdfReader::from_bytes(&bytes).unwrap_err(),
        EdfError::TruncatedSampleRegion { expected: 12, actual: 8 }
    ));
}

#[test]
fn test_truncated_header() {
    let bytes = two_channel_test_bytes();
    assert!(matches!(
        EdfReader::from_bytes(&bytes[..100]).unwrap_err(),
        EdfError::TruncatedHeader { expected: 256, actual: 100 }
    ));
}

#[test]
fn test_truncated_channel_table() {
    let bytes = two_channel_test_bytes();
    let err = EdfReader::from_bytes(&bytes[..300]).unwrap_err();
    assert!(matches!(
        err,
        EdfError::TruncatedChannelTable { field: "transducer", actual: 300, .. }
    ));
}

#[test]
fn test_bad_timestamp() {
    let mut bytes = two_channel_test_bytes();
    bytes[168..176].copy_from_slice(b"31.02.85");
    assert!(matches!(
        EdfReader::from_bytes(&bytes).unwrap_err(),
        EdfError::BadTimestamp(_)
    ));
}

#[test]
fn test_non_numeric_channel_count() {
    let mut bytes = two_channel_test_bytes();
    bytes[252..256].copy_from_slice(b"two ");
    match EdfReader::from_bytes(&bytes).unwrap_err() {
        EdfError::InvalidField { field, offset, .. } => {
            assert_eq!(field, "n_channels");
            assert_eq!(offset, 252);
        }
        other => panic!("expected InvalidField, got {other}"),
    }
}

#[test]
fn test_invalid_text_bytes() {
    let mut bytes = two_channel_test_bytes();
    bytes[8] = 0xff;
    assert!(matches!(
        EdfReader::from_bytes(&bytes).unwrap_err(),
        EdfError::InvalidField { offset: 8, .. }
    ));
}

#[test]
fn test_header_size_mismatch() {
    let mut bytes = two_channel_test_bytes();
    bytes[184..192].copy_from_slice(b"512     ");

    assert!(matches!(
        EdfReader::from_bytes(&bytes).unwrap_err(),
        EdfError::InconsistentHeaderSize { declared: 512, computed: 768 }
    ));

    let options = DecodeOptions::default().validate_header_size(false);
    let reader = EdfReader::from_bytes_with(&bytes, options).unwrap();
    assert_eq!(reader.digital_samples(1).unwrap(), &[100, 101, 102, 103]);
}

#[test]
fn test_negative_channel_count() {
    let mut bytes = two_channel_test_bytes();
    bytes[252..256].copy_from_slice(b"-2  ");
    assert!(matches!(
        EdfReader::from_bytes(&bytes).unwrap_err(),
        EdfError::InvalidSignalCount(-2)
    ));
}

#[test]
fn test_sample_counts_overflow_region_size() {
    // 1000 个通道 × 99999999 样本/记录 × 99999999 个记录，字节数超出 usize
    let mut builder = EdfBuilder::new().n_data_records(99_999_999);
    for i in 0..1000 {
        builder = builder.channel_spec(
            ChannelSpec::new(&format!("C{}", i), 0).samples_field("99999999"),
        );
    }
    let bytes = builder.build();

    assert!(matches!(
        EdfReader::from_bytes(&bytes).unwrap_err(),
        EdfError::LayoutOverflow(_)
    ));
}

#[test]
fn test_large_sample_count_is_truncation() {
    let bytes = EdfBuilder::new()
        .channel_spec(ChannelSpec::new("EEG", 0).samples_field("99999999"))
        .n_data_records(1)
        .build();

    assert!(matches!(
        EdfReader::from_bytes(&bytes).unwrap_err(),
        EdfError::TruncatedSampleRegion { expected: 199_999_998, actual: 0 }
    ));
}

#[test]
fn test_recording_past_time_range() {
    let bytes = EdfBuilder::new()
        .record_duration_ms(99_999_999)
        .channel("EEG", 1)
        .samples(vec![vec![0; 100_000]])
        .build();

    match EdfReader::from_bytes(&bytes).unwrap_err() {
        EdfError::RecordingTooLong {
            n_data_records,
            record_duration_ms,
        } => {
            assert_eq!(n_data_records, 100_000);
            assert_eq!(record_duration_ms, 99_999_999);
        }
        other => panic!("expected RecordingTooLong, got {other}"),
    }
}
