//! Day-range normalization of datetime pagination filters.
//!
//! A datetime property paginates through a `from`/`to` pair. Before use, a
//! present `from` moves to the start of its day and a present `to` to the
//! last second of its day. [`DayBound`] carries both the reference semantics
//! and the target-language expression emitted for it, so the two cannot
//! drift apart.

use chrono::{NaiveDateTime, NaiveTime};

/// Which end of a day a filter bound snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBound {
    /// 00:00:00 of the same day.
    StartOfDay,
    /// 23:59:59 of the same day.
    EndOfDay,
}

impl DayBound {
    /// Normalizes `value` to this bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDateTime;
    /// use crudgen_synth::pagination::DayBound;
    ///
    /// let value = NaiveDateTime::parse_from_str("2024-03-10 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// assert_eq!(DayBound::EndOfDay.apply(value).to_string(), "2024-03-10 23:59:59");
    /// ```
    pub fn apply(self, value: NaiveDateTime) -> NaiveDateTime {
        let time = match self {
            Self::StartOfDay => NaiveTime::default(),
            Self::EndOfDay => NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default(),
        };
        value.date().and_time(time)
    }

    /// Target-language expression normalizing the nullable `variable`,
    /// valid once `variable` is known to be non-null.
    pub fn cs_expression(self, variable: &str) -> String {
        match self {
            Self::StartOfDay => format!("{variable}.Value.Date"),
            Self::EndOfDay => {
                format!("{variable}.Value.Date.AddHours(23).AddMinutes(59).AddSeconds(59)")
            }
        }
    }
}

/// Normalizes an optional `from`/`to` pair.
pub fn normalize_range(
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    (
        from.map(|value| DayBound::StartOfDay.apply(value)),
        to.map(|value| DayBound::EndOfDay.apply(value)),
    )
}
