use crate::InvalidRangeError;
use chrono::{Duration, NaiveDate};
use std::fmt;

/// Inclusive calendar date range with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    /// Creates an interval, rejecting a start that falls after the end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRangeError> {
        if start > end {
            return Err(InvalidRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a single-day interval
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, counting both ends
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns true if the interval covers exactly one calendar day
    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Splits the interval into `n` contiguous, non-overlapping pieces
    ///
    /// Piece `i` covers day offsets `floor(D * i / n)` through
    /// `floor(D * (i + 1) / n) - 1`, where `D` is `num_days()`. Every piece
    /// after the first begins the day after the previous one ends, so no
    /// date appears twice.
    ///
    /// When `n` is below two or exceeds `num_days()` the interval is
    /// returned whole.
    pub fn split(&self, n: usize) -> Vec<DateInterval> {
        let days = self.num_days();
        let n = n as i64;
        if n < 2 || n > days {
            return vec![*self];
        }

        let offset = |k: i64| self.start + Duration::days(days * k / n);

        (0..n)
            .map(|i| DateInterval {
                start: offset(i),
                end: offset(i + 1) - Duration::days(1),
            })
            .collect()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}
