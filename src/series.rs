//! Time-indexed sample streams.

use std::cmp::Ordering;

use chrono::{NaiveDateTime, TimeDelta};

/// An exact offset from the recording start, in milliseconds.
///
/// Stored as a reduced fraction so that sample spacings such as 1000/3 ms
/// compare exactly across channels with different sampling rates.
///
/// ```rust
/// use edfframe::TimeOffset;
///
/// let third = TimeOffset::from_millis_ratio(1000, 3);
/// assert_eq!(third, TimeOffset::from_millis_ratio(2000, 6));
/// assert!(third < TimeOffset::from_millis(334));
/// assert_eq!(third.as_nanos(), Some(333_333_333));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOffset {
    num: u64,
    den: u64,
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl TimeOffset {
    pub const ZERO: TimeOffset = TimeOffset { num: 0, den: 1 };

    pub fn from_millis(ms: u64) -> Self {
        TimeOffset { num: ms, den: 1 }
    }

    /// `num / den` milliseconds. A zero denominator is treated as one.
    pub fn from_millis_ratio(num: u64, den: u64) -> Self {
        let den = den.max(1);
        let divisor = gcd(num, den).max(1);
        TimeOffset {
            num: num / divisor,
            den: den / divisor,
        }
    }

    /// Numerator and denominator of the reduced millisecond fraction
    pub fn as_ratio(&self) -> (u64, u64) {
        (self.num, self.den)
    }

    pub fn as_millis_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Whole nanoseconds, rounded down. `None` past `i64::MAX` nanoseconds
    /// (about 292 years).
    pub fn as_nanos(&self) -> Option<i64> {
        i64::try_from(self.num as u128 * 1_000_000 / self.den as u128).ok()
    }

    pub fn to_delta(&self) -> Option<TimeDelta> {
        self.as_nanos().map(TimeDelta::nanoseconds)
    }

    /// `start` moved forward by this offset, `None` when the result is not
    /// representable.
    pub fn after(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        start.checked_add_signed(self.to_delta()?)
    }
}

impl Ord for TimeOffset {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num as u128 * other.den as u128).cmp(&(other.num as u128 * self.den as u128))
    }
}

impl PartialOrd for TimeOffset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One channel's samples with their positions in time.
///
/// Sample `k` sits at `start + k * record_duration / samples_per_record`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    label: String,
    start: NaiveDateTime,
    record_duration_ms: u64,
    samples_per_record: usize,
    samples: Vec<i32>,
}

impl TimeSeries {
    pub fn new(
        label: impl Into<String>,
        start: NaiveDateTime,
        record_duration_ms: u64,
        samples_per_record: usize,
        samples: Vec<i32>,
    ) -> Self {
        TimeSeries {
            label: label.into(),
            start,
            record_duration_ms,
            samples_per_record,
            samples,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distance between consecutive samples, `None` for a channel that
    /// records nothing.
    pub fn spacing(&self) -> Option<TimeOffset> {
        if self.samples_per_record == 0 {
            return None;
        }
        Some(TimeOffset::from_millis_ratio(
            self.record_duration_ms,
            self.samples_per_record as u64,
        ))
    }

    /// Offset of sample `k` from the recording start
    pub fn offset(&self, k: usize) -> TimeOffset {
        TimeOffset::from_millis_ratio(
            k as u64 * self.record_duration_ms,
            self.samples_per_record as u64,
        )
    }

    pub fn offsets(&self) -> impl Iterator<Item = TimeOffset> + '_ {
        (0..self.samples.len()).map(move |k| self.offset(k))
    }

    /// Sample timestamps in time order.
    ///
    /// Stops at the first sample whose time is not representable as a
    /// `NaiveDateTime`. Series decoded by [`EdfReader`](crate::EdfReader)
    /// never reach that point.
    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.offsets()
            .map_while(move |offset| offset.after(self.start))
    }

    /// `(timestamp, sample)` pairs in time order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, i32)> + '_ {
        self.timestamps().zip(self.samples.iter().copied())
    }
}
