use crate::{expression::ExpressionModel, timezones::resolve_timezone, CronError, Result};
use chrono::{
    DateTime, Datelike, LocalResult, Months, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, trace, warn};

/// Default size of the civil-time window searched for the next occurrence.
pub const DEFAULT_HORIZON_YEARS: u16 = 5;

/// Longest backward jump of civil time in the timezone database.
const MAX_FALL_BACK_HOURS: i64 = 3;

/// Which instant to prefer when a civil time happens twice (DST fall-back).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// The first pass through the repeated hour.
    Earlier,
    /// The second pass through the repeated hour.
    #[default]
    Later,
}

/// Tunables of the occurrence search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IterOptions {
    /// Search for every next occurrence gives up after this number of civil years.
    pub horizon_years: u16,
    /// Resolution of the ambiguous civil times.
    pub overlap: OverlapPolicy,
}

impl Default for IterOptions {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
            overlap: OverlapPolicy::default(),
        }
    }
}

/// Inclusive bounds for the requested number of occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountLimit {
    min: usize,
    max: usize,
}

impl CountLimit {
    /// Default lower bound.
    pub const DEFAULT_MIN: usize = 1;
    /// Default upper bound.
    pub const DEFAULT_MAX: usize = 50;

    /// Constructs limit, `min` should be positive and not greater than `max`.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min == 0 {
            Err(CronError::Config("minimal count should be positive".to_owned()))
        } else if min > max {
            Err(CronError::Config(format!(
                "minimal count {min} is greater than maximal count {max}"
            )))
        } else {
            Ok(Self { min, max })
        }
    }

    /// Lower bound.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Forces `count` into the bounds.
    pub fn clamp(&self, count: usize) -> usize {
        let clamped = count.max(self.min).min(self.max);
        if clamped != count {
            warn!(requested = count, clamped, "count is out of limits");
        }
        clamped
    }
}

impl Default for CountLimit {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Single fire time: the absolute instant and its civil time in the requested zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrence {
    instant: DateTime<Utc>,
    local: DateTime<Tz>,
}

impl Occurrence {
    /// Absolute instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Civil time in the zone of the iteration.
    pub fn local(&self) -> &DateTime<Tz> {
        &self.local
    }

    /// Zone of the iteration.
    pub fn timezone(&self) -> Tz {
        self.local.timezone()
    }
}

impl Display for Occurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%d %H:%M:%S %Z"))
    }
}

/// Returns lazy sequence of occurrences of `model` in `timezone`, strictly after `from`.
///
/// Fails right away if the zone is unknown.
pub fn iterate<T: TimeZone>(model: &ExpressionModel, timezone: &str, from: &DateTime<T>) -> Result<Occurrences> {
    iterate_with(model, timezone, from, IterOptions::default())
}

/// Same as [`iterate`] with custom [`IterOptions`].
pub fn iterate_with<T: TimeZone>(
    model: &ExpressionModel,
    timezone: &str,
    from: &DateTime<T>,
    options: IterOptions,
) -> Result<Occurrences> {
    let tz = resolve_timezone(timezone)?;
    Ok(Occurrences::new(model.clone(), tz, from.with_timezone(&Utc), options))
}

/// Collects the first `count` occurrences, `count` is clamped by `limit` beforehand.
///
/// Returns the first error if the sequence ends earlier.
pub fn next_runs<T: TimeZone>(
    model: &ExpressionModel,
    timezone: &str,
    from: &DateTime<T>,
    count: usize,
    limit: CountLimit,
) -> Result<Vec<Occurrence>> {
    next_runs_with(model, timezone, from, count, limit, IterOptions::default())
}

/// Same as [`next_runs`] with custom [`IterOptions`].
pub fn next_runs_with<T: TimeZone>(
    model: &ExpressionModel,
    timezone: &str,
    from: &DateTime<T>,
    count: usize,
    limit: CountLimit,
    options: IterOptions,
) -> Result<Vec<Occurrence>> {
    let count = limit.clamp(count);
    iterate_with(model, timezone, from, options)?.take(count).collect()
}

/// Iterator over [`Occurrence`]s, see [`iterate`].
///
/// Walks civil time of the zone, so every yielded instant is strictly greater than the previous one,
/// nonexistent civil times are skipped and repeated ones are yielded once.
/// After the first `Err` it yields nothing.
#[derive(Debug, Clone)]
pub struct Occurrences {
    model: ExpressionModel,
    tz: Tz,
    options: IterOptions,
    tick: TimeDelta,
    cursor: Option<NaiveDateTime>,
    last: DateTime<Utc>,
}

impl Occurrences {
    fn new(model: ExpressionModel, tz: Tz, from: DateTime<Utc>, options: IterOptions) -> Self {
        let has_seconds = model.dialect().has_seconds();
        let tick = if has_seconds {
            TimeDelta::seconds(1)
        } else {
            TimeDelta::minutes(1)
        };

        // Civil times repeated by an upcoming fall-back may lie before the civil time of `from`
        // but still map after it, so start from the civil time of `from` in the offset in effect
        // after the transition. Candidates not after `from` are dropped by `resolve`.
        let local = from.with_timezone(&tz).naive_local();
        let start = from
            .checked_add_signed(TimeDelta::hours(MAX_FALL_BACK_HOURS))
            .and_then(|ahead| {
                let offset = ahead.with_timezone(&tz).offset().fix().local_minus_utc();
                from.naive_utc().checked_add_signed(TimeDelta::seconds(offset.into()))
            })
            .map_or(local, |after| after.min(local));

        // Truncate to the tick and step over.
        let truncated = if has_seconds {
            start.with_nanosecond(0)
        } else {
            start.with_second(0).and_then(|dt| dt.with_nanosecond(0))
        };
        let cursor = truncated.and_then(|dt| dt.checked_add_signed(tick));

        debug!(expression = %model, timezone = %tz, %from, "start iteration");
        Self {
            model,
            tz,
            options,
            tick,
            cursor,
            last: from,
        }
    }

    /// Zone of the iteration.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn exhausted(&mut self) -> Option<Result<Occurrence>> {
        self.cursor = None;
        warn!(expression = %self.model, horizon_years = self.options.horizon_years, "no occurrence within horizon");
        Some(Err(CronError::NoOccurrenceFound {
            horizon_years: self.options.horizon_years,
        }))
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.model.day_of_month().contains(date.day() as u8);
        let dow = self
            .model
            .day_of_week()
            .contains(date.weekday().num_days_from_sunday() as u8);

        if self.model.days_are_ored() {
            dom || dow
        } else {
            dom && dow
        }
    }

    /// The first civil time at or after `cursor` accepted by all the fields, not later than `limit` date.
    fn next_civil(&self, mut cursor: NaiveDateTime, limit: NaiveDate) -> Option<NaiveDateTime> {
        let model = &self.model;

        loop {
            let date = cursor.date();
            if date > limit {
                return None;
            }

            let month = cursor.month() as u8;
            if !model.month().contains(month) {
                cursor = match model.month().next_from(month + 1) {
                    Some(next) => start_of_month(date.year(), next)?,
                    None => start_of_month(date.year().checked_add(1)?, model.month().first())?,
                };
                continue;
            }

            if !self.day_matches(date) {
                cursor = start_of_day(date.succ_opt()?)?;
                continue;
            }

            let hour = cursor.hour() as u8;
            if !model.hour().contains(hour) {
                cursor = match model.hour().next_from(hour + 1) {
                    Some(next) => date.and_hms_opt(next.into(), 0, 0)?,
                    None => start_of_day(date.succ_opt()?)?,
                };
                continue;
            }

            let minute = cursor.minute() as u8;
            if !model.minute().contains(minute) {
                cursor = match model.minute().next_from(minute + 1) {
                    Some(next) => date.and_hms_opt(hour.into(), next.into(), 0)?,
                    None => date
                        .and_hms_opt(hour.into(), 0, 0)?
                        .checked_add_signed(TimeDelta::hours(1))?,
                };
                continue;
            }

            let second = cursor.second() as u8;
            let accepted = match model.second() {
                Some(field) => field.contains(second),
                None => second == 0,
            };
            if !accepted {
                cursor = match model.second().and_then(|field| field.next_from(second + 1)) {
                    Some(next) => date.and_hms_opt(hour.into(), minute.into(), next.into())?,
                    None => date
                        .and_hms_opt(hour.into(), minute.into(), 0)?
                        .checked_add_signed(TimeDelta::minutes(1))?,
                };
                continue;
            }

            return Some(cursor);
        }
    }

    /// Maps civil time to the instant, if it exists and goes after the last yielded one.
    fn resolve(&self, civil: NaiveDateTime) -> Option<Occurrence> {
        let candidates = match self.tz.from_local_datetime(&civil) {
            LocalResult::Single(local) => [Some(local), None],
            LocalResult::Ambiguous(earlier, later) => {
                trace!(%civil, timezone = %self.tz, "ambiguous civil time");
                match self.options.overlap {
                    OverlapPolicy::Earlier => [Some(earlier), Some(later)],
                    OverlapPolicy::Later => [Some(later), Some(earlier)],
                }
            }
            LocalResult::None => {
                trace!(%civil, timezone = %self.tz, "skip nonexistent civil time");
                return None;
            }
        };

        candidates
            .into_iter()
            .flatten()
            .map(|local| Occurrence {
                instant: local.with_timezone(&Utc),
                local,
            })
            .find(|occurrence| occurrence.instant > self.last)
    }
}

impl Iterator for Occurrences {
    type Item = Result<Occurrence>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut cursor = self.cursor?;
        let limit = cursor
            .date()
            .checked_add_months(Months::new(12 * u32::from(self.options.horizon_years)))
            .unwrap_or(NaiveDate::MAX);

        loop {
            let Some(civil) = self.next_civil(cursor, limit) else {
                return self.exhausted();
            };

            let following = civil.checked_add_signed(self.tick);
            if let Some(occurrence) = self.resolve(civil) {
                self.cursor = following;
                self.last = occurrence.instant;
                return Some(Ok(occurrence));
            }

            match following {
                Some(next) => cursor = next,
                None => return self.exhausted(),
            }
        }
    }
}

impl std::iter::FusedIterator for Occurrences {}

fn start_of_month(year: i32, month: u8) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month.into(), 1).and_then(start_of_day)
}

fn start_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}
