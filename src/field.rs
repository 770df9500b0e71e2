//! Fixed-width ASCII field decoding.
//!
//! Every header value in an EDF file is a right-padded ASCII field at a known
//! offset. These helpers are the only place raw header bytes are turned into
//! values.

use crate::error::{EdfError, Result};
use crate::types::FieldValue;

/// 取出 `offset..offset + width` 的字节
fn slice<'a>(buf: &'a [u8], field: &str, offset: usize, width: usize) -> Result<&'a [u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or_else(|| EdfError::InvalidField {
            field: field.to_string(),
            offset,
            reason: format!("{} bytes requested, buffer holds {}", width, buf.len()),
        })
}

fn decode<'a>(bytes: &'a [u8], field: &str, offset: usize) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| EdfError::InvalidField {
        field: field.to_string(),
        offset,
        reason: format!("not decodable as text: {}", e),
    })
}

/// Parses an integer the way numeric header fields are written: optional
/// sign, digits, surrounded by padding whitespace.
fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Reads a field that is an integer when it parses as one, text otherwise.
///
/// Text is returned with trailing spaces removed; leading characters are kept
/// as stored.
///
/// # Errors
///
/// * `EdfError::InvalidField` - The slice runs past the buffer or is not
///   valid text
///
/// # Examples
///
/// ```rust
/// use edfframe::{field, FieldValue};
///
/// let buf = b"-100    Unknown ";
/// assert_eq!(field::read(buf, 0, 8)?, FieldValue::Numeric(-100));
/// assert_eq!(field::read(buf, 8, 8)?, FieldValue::Text("Unknown".to_string()));
/// # Ok::<(), edfframe::EdfError>(())
/// ```
pub fn read(buf: &[u8], offset: usize, width: usize) -> Result<FieldValue> {
    read_named(buf, "field", offset, width)
}

/// [`read`] with a field name used in error messages
pub fn read_named(buf: &[u8], field: &str, offset: usize, width: usize) -> Result<FieldValue> {
    let text = decode(slice(buf, field, offset, width)?, field, offset)?;
    Ok(match parse_integer(text) {
        Some(n) => FieldValue::Numeric(n),
        None => FieldValue::Text(text.trim_end_matches(' ').to_string()),
    })
}

/// Reads a purely textual field, stripping trailing padding.
pub fn read_text(buf: &[u8], field: &str, offset: usize, width: usize) -> Result<String> {
    let text = decode(slice(buf, field, offset, width)?, field, offset)?;
    Ok(text.trim_end_matches(' ').to_string())
}

/// Reads a field that must hold an integer.
pub fn read_int(buf: &[u8], field: &str, offset: usize, width: usize) -> Result<i64> {
    match read_named(buf, field, offset, width)? {
        FieldValue::Numeric(n) => Ok(n),
        FieldValue::Text(text) => Err(EdfError::InvalidField {
            field: field.to_string(),
            offset,
            reason: format!("expected an integer, found {:?}", text),
        }),
    }
}
