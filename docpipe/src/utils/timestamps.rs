//! Timestamp utilities.

use chrono::{DateTime, Utc};

/// Represents a parsed UTC timestamp.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// Format: `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`. All timestamps stored in a
/// project context use this representation so context documents stay
/// portable across processes and tooling.
///
/// # Examples
///
/// ```
/// use docpipe::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
        // Parses back as a valid RFC 3339 timestamp.
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_iso_timestamps_are_ordered() {
        let a = iso_timestamp();
        let b = iso_timestamp();
        assert!(a <= b);
    }
}
