//! Time abstraction traits for platform-agnostic timing.
//!
//! Also provides [`MillisInstant`], a 32-bit millisecond uptime counter of the
//! kind most microcontroller HALs expose. Its differences are computed with
//! wrapping subtraction, so elapsed times stay correct across counter rollover.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;
}

/// Trait abstraction for instant types.
///
/// Instants must come from a monotonically non-decreasing clock.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// Millisecond duration backed by a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MillisDuration(pub u32);

impl TimeDuration for MillisDuration {
    const ZERO: Self = MillisDuration(0);

    fn as_millis(&self) -> u64 {
        u64::from(self.0)
    }

    /// Saturates at `u32::MAX` milliseconds.
    fn from_millis(millis: u64) -> Self {
        MillisDuration(u32::try_from(millis).unwrap_or(u32::MAX))
    }
}

/// Instant of a free-running 32-bit millisecond counter.
///
/// The counter rolls over after roughly 49.7 days; [`TimeInstant::duration_since`]
/// uses wrapping subtraction, so any two instants less than one rollover apart
/// produce the correct difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MillisInstant(pub u32);

impl TimeInstant for MillisInstant {
    type Duration = MillisDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        MillisDuration(self.0.wrapping_sub(earlier.0))
    }
}

impl From<u32> for MillisInstant {
    fn from(millis: u32) -> Self {
        MillisInstant(millis)
    }
}
