//! Small helpers shared across modules: size formatting, PDF string and
//! date encoding.

use chrono::{DateTime, SecondsFormat, Utc};
use lopdf::{Object, StringFormat};
use std::time::SystemTime;

/// Format file size as human-readable string.
///
/// # Examples
///
/// ```
/// use pdfmill::utils::format_file_size;
///
/// assert_eq!(format_file_size(500), "500 bytes");
/// assert_eq!(format_file_size(1536), "1.50 KB");
/// ```
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// Encode text as a PDF string object.
///
/// ASCII text is stored as a literal string; anything else as UTF-16BE with
/// a byte order mark, which every PDF reader understands.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string written as UTF-16BE (with BOM) or single-byte text.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Format a time as a PDF date string (`D:YYYYMMDDHHmmSSZ`, UTC).
pub fn format_pdf_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("D:%Y%m%d%H%M%SZ")
        .to_string()
}

/// Format a time as an RFC 3339 UTC timestamp.
pub fn format_rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(500), "500 bytes");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_text_string_round_trip() {
        for text in ["Quarterly report", "Résumé 2024", "日本語"] {
            let Object::String(bytes, _) = text_string(text) else {
                panic!("expected a string object");
            };
            assert_eq!(decode_text_string(&bytes), text);
        }
    }

    #[test]
    fn test_date_formats() {
        // 2024-02-29T13:45:30Z
        let time = UNIX_EPOCH + Duration::from_secs(1_709_214_330);
        assert_eq!(format_pdf_date(time), "D:20240229134530Z");
        assert_eq!(format_rfc3339(time), "2024-02-29T13:45:30Z");
    }
}
