use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

/// RFC 3339 UTC timestamp for log lines, e.g. `2026-10-19T08:12:45.120931Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcRfc3339;

impl FormatTime for UtcRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match OffsetDateTime::now_utc().format(&Rfc3339) {
            Ok(ts) => write!(w, "{ts} "),
            Err(_) => write!(w, "<invalid-time> "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_rfc3339_with_trailing_space() {
        let mut buf = String::new();
        UtcRfc3339.format_time(&mut Writer::new(&mut buf)).unwrap();

        assert!(buf.ends_with("Z "), "unexpected timestamp {buf:?}");
        assert_eq!(buf.as_bytes()[10], b'T', "unexpected timestamp {buf:?}");
    }
}
