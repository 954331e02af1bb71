//! Timezone resolution and the catalog of commonly used zones.

use crate::{CronError, Result};
use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Zone used when nothing else is specified.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Resolves IANA zone identifier, like `Europe/Kyiv`, using bundled timezone database.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CronError::InvalidTimeZone(name.to_owned()))
}

/// Formats zone offset at the specified instant as `UTC+8`, `UTC-3:30` or `UTC+0`.
pub fn offset_label(tz: Tz, at: &DateTime<Utc>) -> String {
    let seconds = tz.offset_from_utc_datetime(&at.naive_utc()).fix().local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);

    if minutes == 0 {
        format!("UTC{sign}{hours}")
    } else {
        format!("UTC{sign}{hours}:{minutes:02}")
    }
}

/// Geographical group of the catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Asia
    Asia,
    /// Europe
    Europe,
    /// North and South America
    America,
    /// Australia and Pacific
    Oceania,
    /// Africa
    Africa,
    /// Coordinated Universal Time
    Utc,
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::America => "America",
            Region::Oceania => "Oceania",
            Region::Africa => "Africa",
            Region::Utc => "UTC",
        };
        f.write_str(name)
    }
}

/// Catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimezoneInfo {
    /// IANA identifier.
    pub value: &'static str,
    /// Human-readable name.
    pub label: &'static str,
    /// Group.
    pub region: Region,
}

impl TimezoneInfo {
    const fn new(value: &'static str, label: &'static str, region: Region) -> Self {
        Self { value, label, region }
    }

    /// Resolved zone.
    pub fn tz(&self) -> Result<Tz> {
        resolve_timezone(self.value)
    }
}

/// Commonly used zones, grouped by region.
pub const TIMEZONES: &[TimezoneInfo] = &[
    TimezoneInfo::new("Asia/Shanghai", "China Standard Time (Beijing)", Region::Asia),
    TimezoneInfo::new("Asia/Hong_Kong", "Hong Kong Time", Region::Asia),
    TimezoneInfo::new("Asia/Tokyo", "Japan Standard Time (Tokyo)", Region::Asia),
    TimezoneInfo::new("Asia/Seoul", "Korea Standard Time (Seoul)", Region::Asia),
    TimezoneInfo::new("Asia/Singapore", "Singapore Time", Region::Asia),
    TimezoneInfo::new("Asia/Kolkata", "India Standard Time (Kolkata)", Region::Asia),
    TimezoneInfo::new("Asia/Dubai", "Gulf Standard Time (Dubai)", Region::Asia),
    TimezoneInfo::new("Asia/Bangkok", "Indochina Time (Bangkok)", Region::Asia),
    TimezoneInfo::new("Europe/London", "British Time (London)", Region::Europe),
    TimezoneInfo::new("Europe/Paris", "Central European Time (Paris)", Region::Europe),
    TimezoneInfo::new("Europe/Berlin", "Central European Time (Berlin)", Region::Europe),
    TimezoneInfo::new("Europe/Moscow", "Moscow Time", Region::Europe),
    TimezoneInfo::new("Europe/Rome", "Central European Time (Rome)", Region::Europe),
    TimezoneInfo::new("Europe/Madrid", "Central European Time (Madrid)", Region::Europe),
    TimezoneInfo::new("America/New_York", "Eastern Time (New York)", Region::America),
    TimezoneInfo::new("America/Chicago", "Central Time (Chicago)", Region::America),
    TimezoneInfo::new("America/Denver", "Mountain Time (Denver)", Region::America),
    TimezoneInfo::new("America/Los_Angeles", "Pacific Time (Los Angeles)", Region::America),
    TimezoneInfo::new("America/Toronto", "Eastern Time (Toronto)", Region::America),
    TimezoneInfo::new("America/Sao_Paulo", "Brasilia Time (Sao Paulo)", Region::America),
    TimezoneInfo::new("America/Mexico_City", "Central Time (Mexico City)", Region::America),
    TimezoneInfo::new("Australia/Sydney", "Australian Eastern Time (Sydney)", Region::Oceania),
    TimezoneInfo::new("Australia/Melbourne", "Australian Eastern Time (Melbourne)", Region::Oceania),
    TimezoneInfo::new("Australia/Perth", "Australian Western Time (Perth)", Region::Oceania),
    TimezoneInfo::new("Pacific/Auckland", "New Zealand Time (Auckland)", Region::Oceania),
    TimezoneInfo::new("Africa/Cairo", "Eastern European Time (Cairo)", Region::Africa),
    TimezoneInfo::new("Africa/Johannesburg", "South Africa Time (Johannesburg)", Region::Africa),
    TimezoneInfo::new("Africa/Lagos", "West Africa Time (Lagos)", Region::Africa),
    TimezoneInfo::new("UTC", "Coordinated Universal Time (UTC)", Region::Utc),
];

/// Looks up catalog entry by IANA identifier.
pub fn find(value: &str) -> Option<&'static TimezoneInfo> {
    TIMEZONES.iter().find(|tz| tz.value == value)
}

/// Catalog entries of the region, in catalog order.
pub fn by_region(region: Region) -> impl Iterator<Item = &'static TimezoneInfo> {
    TIMEZONES.iter().filter(move |tz| tz.region == region)
}
