use airing_config::DailyTime;
use std::time::Duration;
use time::OffsetDateTime;

/// The earliest scheduled time strictly after `now`, in `now`'s offset.
///
/// Returns `None` without any scheduled times.
pub fn next_run(now: OffsetDateTime, times: &[DailyTime]) -> Option<OffsetDateTime> {
    times
        .iter()
        .map(|time| {
            let today = now.replace_time(time.time());
            if today > now { today } else { today + time::Duration::DAY }
        })
        .min()
}

/// How long to sleep from `now` until `next`; zero if `next` already passed.
pub fn wait_until(now: OffsetDateTime, next: OffsetDateTime) -> Duration {
    Duration::try_from(next - now).unwrap_or(Duration::ZERO)
}
