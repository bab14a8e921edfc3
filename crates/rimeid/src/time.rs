use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default epoch: Thursday, January 1, 2015 00:00:00 UTC.
///
/// Subtracting a recent epoch from wall-clock readings maximizes the usable
/// range of the 41-bit timestamp field (~69 years from the epoch).
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of epoch-relative timestamps.
///
/// The unit is **milliseconds** since the source's configured epoch. The
/// abstraction exists so tests can script the clock instead of depending on
/// real time.
///
/// # Example
///
/// ```
/// use rimeid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

/// A wall-clock time source, offset from a configurable epoch.
///
/// Every call reads `SystemTime::now()` and subtracts the epoch. This source
/// deliberately tracks the *wall* clock rather than a monotonic timer: the
/// generator's contract is to detect and reject backward movement of the
/// system clock, which a monotonic source would hide.
///
/// Readings before the epoch saturate to zero; the generator's regression
/// check handles backward movement relative to its own last observation.
#[derive(Clone, Debug)]
pub struct WallClock {
    epoch: Duration,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using a custom epoch as the origin (t = 0),
    /// specified as a [`Duration`] since 1970-01-01 UTC.
    ///
    /// All timestamps embedded into IDs minted against this clock are
    /// relative to `epoch`; decoding them back to real time requires the
    /// same epoch (see [`SnowflakeId::to_unix_millis`]).
    ///
    /// [`SnowflakeId::to_unix_millis`]: crate::SnowflakeId::to_unix_millis
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    /// The epoch this clock measures from, as milliseconds since 1970-01-01
    /// UTC.
    pub const fn epoch_millis(&self) -> u64 {
        self.epoch.as_millis() as u64
    }
}

impl TimeSource for WallClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(self.epoch))
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_epoch_is_2015_01_01() {
        assert_eq!(DEFAULT_EPOCH.as_millis(), 1_420_070_400_000);
    }

    #[test]
    fn wall_clock_reads_are_epoch_relative() {
        let clock = WallClock::default();
        let unix_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        let reading = clock.current_millis();
        assert!(reading > 0);
        assert!(reading + clock.epoch_millis() <= unix_now + 1_000);
    }

    #[test]
    fn wall_clock_saturates_before_its_epoch() {
        // An epoch far in the future forces the subtraction to fail.
        let clock = WallClock::with_epoch(Duration::from_millis(u64::MAX / 4));
        assert_eq!(clock.current_millis(), 0);
    }

    #[test]
    fn wall_clock_never_decreases_between_reads_in_practice() {
        let clock = WallClock::default();
        let a = clock.current_millis();
        let b = clock.current_millis();
        assert!(b >= a);
    }
}
