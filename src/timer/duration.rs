use std::fmt;

/// Game ticks per second on the host's main loop.
pub const TICKS_PER_SECOND: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    const fn millis(self) -> u64 {
        match self {
            TimeUnit::Milliseconds => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Days => 86_400_000,
        }
    }
}

/// An immutable span of time with millisecond resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Duration {
    millis: u64,
}

impl Duration {
    pub const ZERO: Duration = Duration { millis: 0 };

    /// `amount` of `unit`. The caller keeps the product within `u64`.
    pub const fn of(amount: u64, unit: TimeUnit) -> Self {
        Self {
            millis: amount * unit.millis(),
        }
    }

    /// Like [`of`](Duration::of), but `None` when the span or its tick count
    /// would not fit in `u64`.
    pub const fn checked_of(amount: u64, unit: TimeUnit) -> Option<Self> {
        match amount.checked_mul(unit.millis()) {
            Some(millis) if millis.checked_mul(TICKS_PER_SECOND).is_some() => Some(Self { millis }),
            _ => None,
        }
    }

    pub const fn from_ticks(ticks: u64) -> Self {
        Self {
            millis: ticks * 1_000 / TICKS_PER_SECOND,
        }
    }

    /// This span in `unit`, truncated.
    pub const fn get(&self, unit: TimeUnit) -> u64 {
        self.millis / unit.millis()
    }

    /// This span in game ticks, truncated.
    pub const fn ticks(&self) -> u64 {
        self.millis * TICKS_PER_SECOND / 1_000
    }

    pub const fn is_zero(&self) -> bool {
        self.millis == 0
    }
}

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        std::time::Duration::from_millis(value.millis)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.get(TimeUnit::Seconds);
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        if hours > 0 {
            write!(f, "{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            write!(f, "{}m {}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}
