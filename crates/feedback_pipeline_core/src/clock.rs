use chrono::Utc;

/// Wall-clock source for stored item identifiers.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Renders the current time in milliseconds as a decimal item id.
///
/// Two calls within the same millisecond return the same id.
pub fn millis_item_id(clock: &impl Clock) -> String {
    clock.now_millis().to_string()
}
