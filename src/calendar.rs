use crate::{occurrence::Occurrence, utils};
use chrono::{Datelike, NaiveDate};
use std::fmt::Display;

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Single day of the [`MonthGrid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    /// Day of month.
    pub day: u32,
    /// Occurrences of the day, in the original order.
    pub runs: Vec<Occurrence>,
}

impl DayCell {
    /// Returns `true` if anything runs on this day.
    pub fn has_runs(&self) -> bool {
        !self.runs.is_empty()
    }
}

/// One week of the grid, starting on Sunday, `None` for days of the neighbor months.
pub type Week = [Option<DayCell>; 7];

/// Calendar month with occurrences grouped by local civil date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    year: i32,
    month: u32,
    weeks: Vec<Week>,
}

impl MonthGrid {
    /// Builds grid of the month of the first occurrence, other months are ignored.
    ///
    /// Returns `None` for empty input.
    pub fn from_occurrences(occurrences: &[Occurrence]) -> Option<Self> {
        let first = occurrences.first()?.local().date_naive();
        let (year, month) = (first.year(), first.month());
        let days = utils::days_in_month(year, month)?;
        let offset = NaiveDate::from_ymd_opt(year, month, 1)?
            .weekday()
            .num_days_from_sunday();

        let mut cells: Vec<Option<DayCell>> = (0..offset).map(|_| None).collect();
        cells.extend((1..=days).map(|day| {
            let runs = occurrences
                .iter()
                .filter(|o| {
                    let date = o.local().date_naive();
                    date.year() == year && date.month() == month && date.day() == day
                })
                .cloned()
                .collect();
            Some(DayCell { day, runs })
        }));

        let weeks = cells
            .chunks(7)
            .map(|chunk| std::array::from_fn(|i| chunk.get(i).cloned().flatten()))
            .collect();

        Some(Self { year, month, weeks })
    }

    /// Year of the grid.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month of the grid, `1-12`.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Weeks of the month.
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    /// Cell of the specified day of month.
    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.weeks
            .iter()
            .flatten()
            .flatten()
            .find(|cell| cell.day == day)
    }

    /// Number of occurrences within the month.
    pub fn total_runs(&self) -> usize {
        self.weeks
            .iter()
            .flatten()
            .flatten()
            .map(|cell| cell.runs.len())
            .sum()
    }
}

impl Display for MonthGrid {
    /// Plain text calendar, days with runs are marked with `*`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:04}-{:02}", self.year, self.month)?;
        let header = WEEKDAYS.iter().map(|d| format!("{d:>3} ")).collect::<String>();
        writeln!(f, "{}", header.trim_end())?;

        for week in &self.weeks {
            let line = week
                .iter()
                .map(|cell| match cell {
                    Some(cell) => format!("{:>3}{}", cell.day, if cell.has_runs() { '*' } else { ' ' }),
                    None => "    ".to_owned(),
                })
                .collect::<String>();
            writeln!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}
