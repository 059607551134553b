use chrono::{DateTime, FixedOffset, Offset, Utc};

pub mod customers;
pub mod fast_foods;
pub mod home;
pub mod ristoratori;
pub mod users;

/// Orders are persisted in UTC and displayed at the fixed Central European
/// offset.
pub(crate) fn format_order_timestamp(timestamp: DateTime<Utc>) -> String {
    let cet = FixedOffset::east_opt(2 * 3600).unwrap_or_else(|| Utc.fix());
    timestamp
        .with_timezone(&cet)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn order_timestamps_display_at_utc_plus_two() {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_order_timestamp(created_at), "2025-01-15 12:30:00");
    }

    #[test]
    fn display_conversion_crosses_midnight() {
        let created_at = Utc.with_ymd_and_hms(2025, 6, 30, 23, 5, 9).unwrap();
        assert_eq!(format_order_timestamp(created_at), "2025-07-01 01:05:09");
    }
}
