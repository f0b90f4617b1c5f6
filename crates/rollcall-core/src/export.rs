//! CSV serialization of the attendance ledger.

use crate::ledger::AttendanceRecord;
use chrono::SecondsFormat;

/// Header row matching the upstream attendance schema.
pub const CSV_HEADER: &str = "student_id,full_name,checkin_time";

/// Serialize records to CSV bytes: one header row, then one row per record
/// in ledger order, separated by real line breaks.
///
/// The display name is always double-quoted (it may contain commas);
/// timestamps are RFC 3339 with millisecond precision and a `Z` suffix.
pub fn csv_bytes(records: &[AttendanceRecord]) -> Vec<u8> {
    let mut out = String::from(CSV_HEADER);
    for record in records {
        out.push('\n');
        out.push_str(&record.identity_id);
        out.push(',');
        out.push_str(&quote_field(&record.display_name));
        out.push(',');
        out.push_str(
            &record
                .checkin_time
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    out.into_bytes()
}

/// Double-quote a field, doubling any embedded quotes.
fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, name: &str) -> AttendanceRecord {
        AttendanceRecord {
            identity_id: id.into(),
            display_name: name.into(),
            checkin_time: Utc.with_ymd_and_hms(2025, 9, 1, 8, 15, 30).unwrap(),
        }
    }

    #[test]
    fn test_empty_ledger_is_header_only() {
        assert_eq!(csv_bytes(&[]), CSV_HEADER.as_bytes());
    }

    #[test]
    fn test_one_row_per_record() {
        let csv = String::from_utf8(csv_bytes(&[
            record("S1", "Alice"),
            record("S2", "Bob"),
        ]))
        .unwrap();

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "S1,\"Alice\",2025-09-01T08:15:30.000Z");
        assert_eq!(lines[2], "S2,\"Bob\",2025-09-01T08:15:30.000Z");
    }

    #[test]
    fn test_rows_use_real_line_breaks() {
        let csv = String::from_utf8(csv_bytes(&[record("S1", "Alice"), record("S2", "Bob")]))
            .unwrap();
        assert!(csv.contains('\n'));
        assert!(!csv.contains("\\n"));
    }

    #[test]
    fn test_display_name_quoting() {
        let csv = String::from_utf8(csv_bytes(&[record("S1", "O'Neil, Jr. \"Ace\"")])).unwrap();
        assert!(csv.contains("S1,\"O'Neil, Jr. \"\"Ace\"\"\","));
    }
}
