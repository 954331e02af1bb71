use crate::{
    error::{ParseError, ParseErrorReason},
    utils,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Semantic kind of the cron field, defines its bounds and allowed aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Seconds, `0-59`, leading field of the 6-fields dialect only.
    Second,
    /// Minutes, `0-59`.
    Minute,
    /// Hours, `0-23`.
    Hour,
    /// Day of month, `1-31`.
    DayOfMonth,
    /// Month, `1-12` or `JAN-DEC`.
    Month,
    /// Day of week, `0-6` or `SUN-SAT`, `0` is Sunday.
    DayOfWeek,
}

impl FieldKind {
    pub(crate) const DAYS_OF_WEEK: [&'static str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
    pub(crate) const MONTHS: [&'static str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];

    /// Inclusive lower and upper bounds of the field values.
    pub const fn bounds(self) -> (u8, u8) {
        match self {
            Self::Second | Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (0, 6),
        }
    }

    /// Number of distinct values within bounds.
    pub const fn cardinality(self) -> usize {
        let (min, max) = self.bounds();
        (max - min) as usize + 1
    }

    /// Lowercase human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day of month",
            Self::Month => "month",
            Self::DayOfWeek => "day of week",
        }
    }

    fn parse_value(self, token: &str) -> Result<u8, ParseError> {
        if token.is_empty() {
            return Err(ParseError::new(self, token, ParseErrorReason::Empty));
        }

        let (min, max) = self.bounds();
        if let Some(value) = utils::parse_number(token) {
            return match u8::try_from(value) {
                Ok(value) if (min..=max).contains(&value) => Ok(value),
                _ => Err(ParseError::new(self, token, ParseErrorReason::OutOfBounds { min, max })),
            };
        }

        let alias = match self {
            Self::Month => utils::parse_alias(token, &Self::MONTHS).map(|v| v + 1),
            Self::DayOfWeek => utils::parse_alias(token, &Self::DAYS_OF_WEEK),
            _ => None,
        };

        alias.ok_or_else(|| ParseError::new(self, token, ParseErrorReason::Malformed))
    }

    fn parse_range(self, start: &str, end: &str, term: &str) -> Result<(u8, u8), ParseError> {
        let start = self.parse_value(start)?;
        let end = self.parse_value(end)?;
        if start > end {
            Err(ParseError::new(self, term, ParseErrorReason::InvertedRange))
        } else {
            Ok((start, end))
        }
    }

    fn parse_step(self, step: &str, term: &str) -> Result<u32, ParseError> {
        if step.is_empty() {
            return Err(ParseError::new(self, term, ParseErrorReason::Empty));
        }

        match utils::parse_number(step) {
            Some(0) => Err(ParseError::new(self, term, ParseErrorReason::NonPositiveStep)),
            Some(step) => Ok(step),
            None if step.strip_prefix('-').and_then(utils::parse_number).is_some() => {
                Err(ParseError::new(self, term, ParseErrorReason::NonPositiveStep))
            }
            None => Err(ParseError::new(self, step, ParseErrorReason::Malformed)),
        }
    }

    fn parse_term(self, term: &str) -> Result<Term, ParseError> {
        if term.is_empty() {
            Err(ParseError::new(self, term, ParseErrorReason::Empty))
        } else if let Some((base, step)) = term.split_once('/') {
            let step = self.parse_step(step, term)?;
            let base = if base == "*" {
                StepBase::All
            } else if let Some((start, end)) = base.split_once('-') {
                let (start, end) = self.parse_range(start, end, term)?;
                StepBase::Range(start, end)
            } else {
                StepBase::From(self.parse_value(base)?)
            };
            Ok(Term::Step(base, step))
        } else if term == "*" {
            Ok(Term::All)
        } else if let Some((start, end)) = term.split_once('-') {
            let (start, end) = self.parse_range(start, end, term)?;
            Ok(Term::Range(start, end))
        } else {
            Ok(Term::Value(self.parse_value(term)?))
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Starting point of the stepped term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepBase {
    /// `*/S`
    All,
    /// `N/S`, up to the field maximum.
    From(u8),
    /// `N-M/S`
    Range(u8, u8),
}

/// Single member of the comma-separated field pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// `*`
    All,
    /// `N`
    Value(u8),
    /// `N-M`
    Range(u8, u8),
    /// Every S-th value of the base.
    Step(StepBase, u32),
}

impl Term {
    /// First value, last value and step of the series this term covers.
    pub fn span(&self, kind: FieldKind) -> (u8, u8, u32) {
        let (min, max) = kind.bounds();
        match *self {
            Term::All => (min, max, 1),
            Term::Value(value) => (value, value, 1),
            Term::Range(start, end) => (start, end, 1),
            Term::Step(StepBase::All, step) => (min, max, step),
            Term::Step(StepBase::From(start), step) => (start, max, step),
            Term::Step(StepBase::Range(start, end), step) => (start, end, step),
        }
    }

    fn mask(&self, kind: FieldKind) -> u64 {
        let (start, end, step) = self.span(kind);
        let step = usize::try_from(step).unwrap_or(usize::MAX).max(1);
        (start..=end.min(63)).step_by(step).fold(0, |mask, v| mask | (1 << v))
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::All => write!(f, "*"),
            Term::Value(value) => write!(f, "{value}"),
            Term::Range(start, end) => write!(f, "{start}-{end}"),
            Term::Step(StepBase::All, step) => write!(f, "*/{step}"),
            Term::Step(StepBase::From(start), step) => write!(f, "{start}/{step}"),
            Term::Step(StepBase::Range(start, end), step) => write!(f, "{start}-{end}/{step}"),
        }
    }
}

/// Parsed and validated cron field.
///
/// Keeps the parsed terms for display and the resolved set of accepted values.
/// The set is never empty and all its values are within [`FieldKind::bounds`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    kind: FieldKind,
    terms: Vec<Term>,
    mask: u64,
}

impl FieldSpec {
    /// Parses the field `input` according to the `kind` bounds.
    ///
    /// Accepts `*`, `N`, `N-M`, `*/S`, `N/S`, `N-M/S` and comma-separated lists of them;
    /// months and days of week accept three-letter aliases as well.
    pub fn parse(kind: FieldKind, input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::new(kind, input, ParseErrorReason::Empty));
        }

        let terms = input
            .split(',')
            .map(|term| {
                // Empty list member or range end: point at the whole pattern instead.
                kind.parse_term(term).map_err(|mut err| {
                    if err.token.is_empty() {
                        err.token = input.to_owned();
                    }
                    err
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mask = terms.iter().fold(0, |mask, term| mask | term.mask(kind));

        Ok(Self { kind, terms, mask })
    }

    /// Kind of the field.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Parsed terms in the original order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Returns `true` if `value` is accepted by the field.
    #[inline]
    pub fn contains(&self, value: u8) -> bool {
        value < 64 && (self.mask >> value) & 1 == 1
    }

    /// Number of accepted values.
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Always `false` for a parsed field, present for completeness.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Accepted values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        let (min, max) = self.kind.bounds();
        (min..=max).filter(|v| self.contains(*v))
    }

    /// The smallest accepted value.
    pub fn first(&self) -> u8 {
        self.mask.trailing_zeros() as u8
    }

    /// The smallest accepted value which is greater or equal to `value`.
    #[inline]
    pub fn next_from(&self, value: u8) -> Option<u8> {
        if value >= 64 {
            return None;
        }

        let rest = self.mask >> value;
        if rest == 0 {
            None
        } else {
            Some(value + rest.trailing_zeros() as u8)
        }
    }

    /// Returns `true` if the field accepts every value of its range, whatever the pattern is.
    pub fn is_unrestricted(&self) -> bool {
        self.len() == self.kind.cardinality()
    }
}

impl Display for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let terms = self.terms.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(",");
        write!(f, "{terms}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rstest_reuse::{apply, template};

    fn values(kind: FieldKind, input: &str) -> Vec<u8> {
        FieldSpec::parse(kind, input).unwrap().values().collect()
    }

    #[template]
    #[rstest]
    #[case(FieldKind::Second)]
    #[case(FieldKind::Minute)]
    #[case(FieldKind::Hour)]
    #[case(FieldKind::DayOfMonth)]
    #[case(FieldKind::Month)]
    #[case(FieldKind::DayOfWeek)]
    fn all_kinds(#[case] kind: FieldKind) {}

    #[apply(all_kinds)]
    fn wildcard_covers_whole_range(kind: FieldKind) {
        let (min, max) = kind.bounds();
        let field = FieldSpec::parse(kind, "*").unwrap();

        assert!(field.is_unrestricted());
        assert_eq!(field.len(), kind.cardinality());
        assert_eq!(field.first(), min);
        assert_eq!(field.values().last(), Some(max));
    }

    #[apply(all_kinds)]
    fn values_beyond_bounds_are_rejected(kind: FieldKind) {
        let (min, max) = kind.bounds();
        let above = (max + 1).to_string();
        let err = FieldSpec::parse(kind, &above).unwrap_err();
        assert_eq!(err, ParseError::new(kind, above, ParseErrorReason::OutOfBounds { min, max }));

        if min > 0 {
            let below = (min - 1).to_string();
            let err = FieldSpec::parse(kind, &below).unwrap_err();
            assert_eq!(err.reason, ParseErrorReason::OutOfBounds { min, max });
        }
    }

    #[apply(all_kinds)]
    fn full_range_is_unrestricted(kind: FieldKind) {
        let (min, max) = kind.bounds();
        let field = FieldSpec::parse(kind, &format!("{min}-{max}")).unwrap();
        assert!(field.is_unrestricted());

        let field = FieldSpec::parse(kind, &format!("{min}-{}", max - 1)).unwrap();
        assert!(!field.is_unrestricted());
    }

    #[rstest]
    #[case(FieldKind::Minute, "5", vec![5])]
    #[case(FieldKind::Minute, "2-5", vec![2, 3, 4, 5])]
    #[case(FieldKind::Minute, "5-5", vec![5])]
    #[case(FieldKind::Minute, "*/15", vec![0, 15, 30, 45])]
    #[case(FieldKind::Minute, "*/25", vec![0, 25, 50])]
    #[case(FieldKind::Minute, "*/60", vec![0])]
    #[case(FieldKind::Minute, "10-30/10", vec![10, 20, 30])]
    #[case(FieldKind::Minute, "10-31/10", vec![10, 20, 30])]
    #[case(FieldKind::Minute, "50/3", vec![50, 53, 56, 59])]
    #[case(FieldKind::Minute, "3,1,2-5", vec![1, 2, 3, 4, 5])]
    #[case(FieldKind::Minute, "0,30,*/30", vec![0, 30])]
    #[case(FieldKind::Hour, "9-17/4,23", vec![9, 13, 17, 23])]
    #[case(FieldKind::DayOfMonth, "*/10", vec![1, 11, 21, 31])]
    #[case(FieldKind::DayOfMonth, "L", vec![])]
    #[case(FieldKind::Month, "*/3", vec![1, 4, 7, 10])]
    #[case(FieldKind::Month, "jan,Jun,DEC", vec![1, 6, 12])]
    #[case(FieldKind::Month, "jun-sep/2", vec![6, 8])]
    #[case(FieldKind::DayOfWeek, "MON-FRI", vec![1, 2, 3, 4, 5])]
    #[case(FieldKind::DayOfWeek, "sun,sat", vec![0, 6])]
    #[case(FieldKind::DayOfWeek, "*/2", vec![0, 2, 4, 6])]
    fn test_parse_values(#[case] kind: FieldKind, #[case] input: &str, #[case] expected: Vec<u8>) {
        if expected.is_empty() {
            assert!(FieldSpec::parse(kind, input).is_err(), "kind = {kind:?}, input = {input}");
        } else {
            assert_eq!(values(kind, input), expected, "kind = {kind:?}, input = {input}");
        }
    }

    #[test]
    fn step_over_minutes_has_twelve_values() {
        let expected = (0..60).step_by(5).collect::<Vec<u8>>();
        assert_eq!(values(FieldKind::Minute, "*/5"), expected);
        assert_eq!(expected.len(), 12);
    }

    #[rstest]
    #[case(FieldKind::Minute, "61", "61", ParseErrorReason::OutOfBounds { min: 0, max: 59 })]
    #[case(FieldKind::Minute, "", "", ParseErrorReason::Empty)]
    #[case(FieldKind::Minute, "1,,2", "1,,2", ParseErrorReason::Empty)]
    #[case(FieldKind::Minute, "1,", "1,", ParseErrorReason::Empty)]
    #[case(FieldKind::Minute, "abc", "abc", ParseErrorReason::Malformed)]
    #[case(FieldKind::Minute, "1-2-3", "2-3", ParseErrorReason::Malformed)]
    #[case(FieldKind::Minute, "+5", "+5", ParseErrorReason::Malformed)]
    #[case(FieldKind::Minute, "5-1", "5-1", ParseErrorReason::InvertedRange)]
    #[case(FieldKind::Minute, "5-1/2", "5-1/2", ParseErrorReason::InvertedRange)]
    #[case(FieldKind::Minute, "*/0", "*/0", ParseErrorReason::NonPositiveStep)]
    #[case(FieldKind::Minute, "*/-5", "*/-5", ParseErrorReason::NonPositiveStep)]
    #[case(FieldKind::Minute, "*/", "*/", ParseErrorReason::Empty)]
    #[case(FieldKind::Minute, "*/x", "x", ParseErrorReason::Malformed)]
    #[case(FieldKind::Minute, "*/2/3", "2/3", ParseErrorReason::Malformed)]
    #[case(FieldKind::Minute, "-", "-", ParseErrorReason::Empty)]
    #[case(FieldKind::Minute, "1-", "1-", ParseErrorReason::Empty)]
    #[case(FieldKind::Minute, "10,75", "75", ParseErrorReason::OutOfBounds { min: 0, max: 59 })]
    #[case(FieldKind::Minute, "MON", "MON", ParseErrorReason::Malformed)]
    #[case(FieldKind::Hour, "24", "24", ParseErrorReason::OutOfBounds { min: 0, max: 23 })]
    #[case(FieldKind::DayOfMonth, "0", "0", ParseErrorReason::OutOfBounds { min: 1, max: 31 })]
    #[case(FieldKind::DayOfMonth, "?", "?", ParseErrorReason::Malformed)]
    #[case(FieldKind::DayOfMonth, "15W", "15W", ParseErrorReason::Malformed)]
    #[case(FieldKind::Month, "13", "13", ParseErrorReason::OutOfBounds { min: 1, max: 12 })]
    #[case(FieldKind::Month, "January", "January", ParseErrorReason::Malformed)]
    #[case(FieldKind::DayOfWeek, "7", "7", ParseErrorReason::OutOfBounds { min: 0, max: 6 })]
    #[case(FieldKind::DayOfWeek, "fri-mon", "fri-mon", ParseErrorReason::InvertedRange)]
    #[case(FieldKind::DayOfWeek, "1#2", "1#2", ParseErrorReason::Malformed)]
    fn test_parse_invalid(
        #[case] kind: FieldKind,
        #[case] input: &str,
        #[case] token: &str,
        #[case] reason: ParseErrorReason,
    ) {
        let err = FieldSpec::parse(kind, input).unwrap_err();
        assert_eq!(err, ParseError::new(kind, token, reason), "input = '{input}'");
    }

    #[test]
    fn error_message_names_field_and_token() {
        let err = FieldSpec::parse(FieldKind::Minute, "61").unwrap_err();
        assert_eq!(err.to_string(), "invalid minute value '61': out of range 0-59");

        let err = FieldSpec::parse(FieldKind::Hour, "1,,2").unwrap_err();
        assert_eq!(err.to_string(), "invalid hour value '1,,2': empty value");
    }

    #[rstest]
    #[case(FieldKind::Minute, "*")]
    #[case(FieldKind::Minute, "*/5")]
    #[case(FieldKind::Minute, "3,1,2-5,12/3,10-22/4")]
    #[case(FieldKind::Month, "1-12/4")]
    #[case(FieldKind::DayOfWeek, "0,6")]
    fn test_display(#[case] kind: FieldKind, #[case] input: &str) {
        assert_eq!(FieldSpec::parse(kind, input).unwrap().to_string(), input);
    }

    #[test]
    fn display_resolves_aliases() {
        assert_eq!(FieldSpec::parse(FieldKind::DayOfWeek, "mon-FRI").unwrap().to_string(), "1-5");
        assert_eq!(FieldSpec::parse(FieldKind::Month, "mar/2").unwrap().to_string(), "3/2");
    }

    #[rstest]
    #[case("0,15,30,45", 0, Some(0))]
    #[case("0,15,30,45", 1, Some(15))]
    #[case("0,15,30,45", 45, Some(45))]
    #[case("0,15,30,45", 46, None)]
    #[case("0,15,30,45", 64, None)]
    #[case("59", 0, Some(59))]
    fn test_next_from(#[case] input: &str, #[case] from: u8, #[case] expected: Option<u8>) {
        let field = FieldSpec::parse(FieldKind::Minute, input).unwrap();
        assert_eq!(field.next_from(from), expected);
    }

    #[test]
    fn contains_respects_mask() {
        let field = FieldSpec::parse(FieldKind::Hour, "9-17").unwrap();
        assert!(field.contains(9));
        assert!(field.contains(17));
        assert!(!field.contains(8));
        assert!(!field.contains(18));
        assert!(!field.contains(200));
        assert_eq!(field.len(), 9);
        assert_eq!(field.first(), 9);
        assert!(!field.is_empty());
    }
}
