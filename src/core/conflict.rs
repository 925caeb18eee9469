//! Last-write-wins conflict resolution.
//!
//! Records that exist on both sides of an import are reconciled by their
//! modification timestamps. Incoming data without a timestamp counts as a
//! fresh edit.

use chrono::{DateTime, Utc};

/// Outcome of comparing an existing record against an incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The incoming record replaces the stored one.
    TakeIncoming,
    /// The stored record is newer and stays as-is.
    KeepExisting,
}

/// Decide which side of a conflict wins.
///
/// Ties go to the incoming record so that re-importing an export taken from
/// the same store is not silently dropped.
#[must_use]
pub fn resolve_last_write_wins(
    existing_modified: DateTime<Utc>,
    incoming_modified: Option<DateTime<Utc>>,
) -> Resolution {
    match incoming_modified {
        Some(incoming) if incoming < existing_modified => Resolution::KeepExisting,
        _ => Resolution::TakeIncoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_newer_incoming_wins() {
        let now = Utc::now();
        let resolution = resolve_last_write_wins(now, Some(now + Duration::seconds(5)));
        assert_eq!(resolution, Resolution::TakeIncoming);
    }

    #[test]
    fn test_older_incoming_loses() {
        let now = Utc::now();
        let resolution = resolve_last_write_wins(now, Some(now - Duration::minutes(1)));
        assert_eq!(resolution, Resolution::KeepExisting);
    }

    #[test]
    fn test_tie_and_missing_timestamp_take_incoming() {
        let now = Utc::now();
        assert_eq!(resolve_last_write_wins(now, Some(now)), Resolution::TakeIncoming);
        assert_eq!(resolve_last_write_wins(now, None), Resolution::TakeIncoming);
    }
}
