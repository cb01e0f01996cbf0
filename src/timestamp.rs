use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Convert a [`SystemTime`] to signed nanoseconds relative to the Unix
/// epoch.
///
/// Times before the epoch map to negative values so the result orders the
/// same way the original timestamps do.
pub(crate) fn system_time_to_nanos(time: SystemTime) -> i128 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_nanos() as i128,
        Err(before) => -(before.duration().as_nanos() as i128),
    }
}

/// Inverse of [`system_time_to_nanos`], used when reporting ages.
pub(crate) fn nanos_to_system_time(nanos: i128) -> SystemTime {
    let magnitude = nanos.unsigned_abs();
    let secs = u64::try_from(magnitude / 1_000_000_000).unwrap_or(u64::MAX);
    let duration = Duration::new(secs, (magnitude % 1_000_000_000) as u32);

    if nanos >= 0 {
        UNIX_EPOCH.checked_add(duration)
    } else {
        UNIX_EPOCH.checked_sub(duration)
    }
    .unwrap_or(UNIX_EPOCH)
}

/// Whole days between `atime` and now, zero for times in the future.
pub(crate) fn age_in_days(atime_nanos: i128) -> u64 {
    SystemTime::now()
        .duration_since(nanos_to_system_time(atime_nanos))
        .map(|d| d.as_secs() / (24 * 60 * 60))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanos_round_trip_after_epoch() {
        let time = UNIX_EPOCH + Duration::new(1_700_000_000, 123);
        let nanos = system_time_to_nanos(time);
        assert_eq!(nanos, 1_700_000_000_000_000_123);
        assert_eq!(nanos_to_system_time(nanos), time);
    }

    #[test]
    fn test_pre_epoch_orders_before_epoch() {
        let before = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(system_time_to_nanos(before), -10_000_000_000);
        assert!(system_time_to_nanos(before) < system_time_to_nanos(UNIX_EPOCH));
        assert_eq!(nanos_to_system_time(-10_000_000_000), before);
    }

    #[test]
    fn test_age_in_days() {
        let three_days_ago = SystemTime::now() - Duration::from_secs(3 * 24 * 60 * 60 + 60);
        assert_eq!(age_in_days(system_time_to_nanos(three_days_ago)), 3);

        let future = SystemTime::now() + Duration::from_secs(3600);
        assert_eq!(age_in_days(system_time_to_nanos(future)), 0);
    }
}
