//! The 256-byte recording header.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{EdfError, Result};
use crate::field;
use crate::types::{OpaqueRegion, RecordingHeader};
use crate::HEADER_BASE_BYTES;

/// Parses the fixed recording header from the start of `buf`.
///
/// Only the first 256 bytes are looked at. Header-size consistency is
/// checked by the caller (see [`DecodeOptions`](crate::DecodeOptions)).
///
/// # Errors
///
/// * `EdfError::TruncatedHeader` - `buf` holds fewer than 256 bytes
/// * `EdfError::BadTimestamp` - The start date/time is not `dd.mm.yyhh.mm.ss`
/// * `EdfError::InvalidField` - A numeric field does not hold an integer
/// * `EdfError::InvalidSignalCount` / `EdfError::InvalidRecordCount` -
///   Negative counts
pub fn parse_header(buf: &[u8]) -> Result<RecordingHeader> {
    if buf.len() < HEADER_BASE_BYTES {
        return Err(EdfError::TruncatedHeader {
            expected: HEADER_BASE_BYTES,
            actual: buf.len(),
        });
    }
    let buf = &buf[..HEADER_BASE_BYTES];

    let version = field::read_int(buf, "version", 0, 8)?;
    let patient_id = field::read_text(buf, "patient_id", 8, 80)?;
    let recording_id = field::read_text(buf, "recording_id", 88, 80)?;
    let start_field = field::read_text(buf, "start", 168, 16)?;
    let start = parse_start(&start_field)?;
    let header_bytes = field::read_int(buf, "header_bytes", 184, 8)?;
    // 192..236 保留字段（EDF+ 在此标记 "EDF+C"/"EDF+D"），原样保留
    let reserved = OpaqueRegion::from(&buf[192..236]);
    let n_data_records = field::read_int(buf, "n_data_records", 236, 8)?;
    let record_duration_ms = field::read_int(buf, "record_duration", 244, 8)?;
    let n_channels = field::read_int(buf, "n_channels", 252, 4)?;

    if n_channels < 0 {
        return Err(EdfError::InvalidSignalCount(n_channels));
    }
    if n_data_records < 0 {
        return Err(EdfError::InvalidRecordCount(n_data_records));
    }
    if record_duration_ms < 0 {
        return Err(EdfError::InvalidRecordDuration(record_duration_ms));
    }

    Ok(RecordingHeader {
        version,
        patient_id,
        recording_id,
        start,
        header_bytes,
        reserved,
        n_data_records,
        record_duration_ms,
        n_channels,
    })
}

/// Parses `dd.mm.yyhh.mm.ss`, keeping the two-digit year as the literal year.
fn parse_start(field: &str) -> Result<NaiveDateTime> {
    let bad = || EdfError::BadTimestamp(field.to_string());

    if field.len() != 16 || !field.is_ascii() {
        return Err(bad());
    }
    let (date_str, time_str) = field.split_at(8);

    let [day, month, year] = split_triplet(date_str).ok_or_else(bad)?;
    let [hour, minute, second] = split_triplet(time_str).ok_or_else(bad)?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(bad)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(bad)?;
    Ok(date.and_time(time))
}

/// 解析 "aa.bb.cc"，每段必须是两位数字
fn split_triplet(s: &str) -> Option<[u32; 3]> {
    let mut parts = s.split('.');
    let mut out = [0u32; 3];
    for slot in out.iter_mut() {
        let part = parts.next()?;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(out),
    }
}
