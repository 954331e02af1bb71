use crate::{
    error::ValidationError,
    field::{FieldKind, FieldSpec},
    CronError,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use tracing::debug;

/// Field layout variant of the cron expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CronDialect {
    /// Classic crontab: minute, hour, day of month, month, day of week.
    #[default]
    #[serde(rename = "crontab5", alias = "classic5", alias = "5")]
    Classic5,
    /// Classic crontab with leading seconds: second, minute, hour, day of month, month, day of week.
    #[serde(rename = "crontab6", alias = "classic6", alias = "6")]
    Classic6,
}

impl CronDialect {
    const CLASSIC5_KINDS: [FieldKind; 5] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];
    const CLASSIC6_KINDS: [FieldKind; 6] = [
        FieldKind::Second,
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];

    /// Field kinds in positional order.
    pub const fn kinds(self) -> &'static [FieldKind] {
        match self {
            Self::Classic5 => &Self::CLASSIC5_KINDS,
            Self::Classic6 => &Self::CLASSIC6_KINDS,
        }
    }

    /// Expected number of fields.
    pub const fn arity(self) -> usize {
        self.kinds().len()
    }

    /// Returns `true` if the dialect has a seconds field.
    pub const fn has_seconds(self) -> bool {
        matches!(self, Self::Classic6)
    }

    /// Names of the fields in positional order, for messages.
    pub const fn layout(self) -> &'static str {
        match self {
            Self::Classic5 => "minute hour day-of-month month day-of-week",
            Self::Classic6 => "second minute hour day-of-month month day-of-week",
        }
    }

    /// Stable textual name, the one used in share links.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classic5 => "crontab5",
            Self::Classic6 => "crontab6",
        }
    }

    /// Fields of the `@` macro for this dialect.
    fn expand_macro(self, name: &str) -> Option<&'static str> {
        let (classic5, classic6) = match name.to_ascii_lowercase().as_str() {
            "@yearly" | "@annually" => ("0 0 1 1 *", "0 0 0 1 1 *"),
            "@monthly" => ("0 0 1 * *", "0 0 0 1 * *"),
            "@weekly" => ("0 0 * * 0", "0 0 0 * * 0"),
            "@daily" | "@midnight" => ("0 0 * * *", "0 0 0 * * *"),
            "@hourly" => ("0 * * * *", "0 0 * * * *"),
            _ => return None,
        };

        Some(if self.has_seconds() { classic6 } else { classic5 })
    }
}

impl Display for CronDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CronDialect {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crontab5" | "classic5" | "5" => Ok(Self::Classic5),
            "crontab6" | "classic6" | "6" => Ok(Self::Classic6),
            _ => Err(CronError::InvalidDialect(s.to_owned())),
        }
    }
}

/// Trims the expression and collapses whitespace runs into single spaces.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses and validates `raw` expression for the `dialect`.
///
/// Shortcut for [`ExpressionModel::new`].
pub fn validate(raw: &str, dialect: CronDialect) -> Result<ExpressionModel, ValidationError> {
    ExpressionModel::new(raw, dialect)
}

/// Validated cron expression: the normalized text and its parsed fields.
///
/// The only way to get one is [`ExpressionModel::new`], so the number and kinds
/// of the fields always match the dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpressionModel {
    dialect: CronDialect,
    text: String,
    fields: Vec<FieldSpec>,
}

impl ExpressionModel {
    /// Parses and validates provided expression and constructs [`ExpressionModel`] instance.
    ///
    /// Fails on the first invalid field, no partial recovery is attempted.
    pub fn new(raw: &str, dialect: CronDialect) -> Result<Self, ValidationError> {
        let text = normalize(raw);
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }

        let elements: Vec<&str> = match text.strip_prefix('@') {
            Some(_) if !text.contains(' ') => dialect
                .expand_macro(&text)
                .ok_or_else(|| ValidationError::UnknownMacro(text.clone()))?
                .split(' ')
                .collect(),
            _ => text.split(' ').collect(),
        };

        if elements.len() != dialect.arity() {
            debug!(expression = %text, %dialect, actual = elements.len(), "wrong number of fields");
            return Err(ValidationError::FieldCountMismatch {
                dialect,
                expected: dialect.arity(),
                actual: elements.len(),
            });
        }

        let fields = dialect
            .kinds()
            .iter()
            .zip(elements)
            .map(|(kind, element)| FieldSpec::parse(*kind, element))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| debug!(expression = %text, error = %err, "invalid field"))?;

        debug!(expression = %text, %dialect, "expression is valid");
        Ok(Self { dialect, text, fields })
    }

    /// Dialect the expression was validated against.
    pub fn dialect(&self) -> CronDialect {
        self.dialect
    }

    /// Normalized expression text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All fields in positional order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field of the specified kind, `None` only for seconds of the 5-fields dialect.
    pub fn field(&self, kind: FieldKind) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.kind() == kind)
    }

    /// Seconds field, 6-fields dialect only.
    pub fn second(&self) -> Option<&FieldSpec> {
        self.field(FieldKind::Second)
    }

    /// Minutes field.
    pub fn minute(&self) -> &FieldSpec {
        self.positional(0)
    }

    /// Hours field.
    pub fn hour(&self) -> &FieldSpec {
        self.positional(1)
    }

    /// Day of month field.
    pub fn day_of_month(&self) -> &FieldSpec {
        self.positional(2)
    }

    /// Month field.
    pub fn month(&self) -> &FieldSpec {
        self.positional(3)
    }

    /// Day of week field.
    pub fn day_of_week(&self) -> &FieldSpec {
        self.positional(4)
    }

    /// Returns `true` if both day fields are restricted, so they are ORed.
    pub fn days_are_ored(&self) -> bool {
        !self.day_of_month().is_unrestricted() && !self.day_of_week().is_unrestricted()
    }

    #[inline]
    fn positional(&self, index: usize) -> &FieldSpec {
        // Minute..DayOfWeek are the last five fields of both dialects.
        &self.fields[self.fields.len() - 5 + index]
    }
}

impl Display for ExpressionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, ParseErrorReason};
    use rstest::rstest;

    #[rstest]
    #[case("*/5 * * * *", "*/5 * * * *")]
    #[case("  */5   *\t* *\n*  ", "*/5 * * * *")]
    #[case("", "")]
    #[case(" \t ", "")]
    #[case("@daily", "@daily")]
    fn test_normalize(#[case] raw: &str, #[case] expected: &str) {
        let once = normalize(raw);
        assert_eq!(once, expected);
        assert_eq!(normalize(&once), once);
    }

    #[rstest]
    #[case("a b c d", CronDialect::Classic5, 5, 4)]
    #[case("* * * * * *", CronDialect::Classic5, 5, 6)]
    #[case("* * * * *", CronDialect::Classic6, 6, 5)]
    #[case("0 0 0 * * * *", CronDialect::Classic6, 6, 7)]
    #[case("@daily 5", CronDialect::Classic5, 5, 2)]
    fn test_field_count_mismatch(
        #[case] raw: &str,
        #[case] dialect: CronDialect,
        #[case] expected: usize,
        #[case] actual: usize,
    ) {
        assert_eq!(
            validate(raw, dialect),
            Err(ValidationError::FieldCountMismatch {
                dialect,
                expected,
                actual
            })
        );
    }

    #[test]
    fn field_count_message_lists_layout() {
        let err = validate("a b c d", CronDialect::Classic5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected 5 fields (minute hour day-of-month month day-of-week) but got 4"
        );
    }

    #[test]
    fn empty_expression_is_rejected() {
        assert_eq!(validate("   ", CronDialect::Classic5), Err(ValidationError::Empty));
    }

    #[rstest]
    #[case("61 * * * *", CronDialect::Classic5, FieldKind::Minute, "61")]
    #[case("* 24 * * *", CronDialect::Classic5, FieldKind::Hour, "24")]
    #[case("* * 0 * *", CronDialect::Classic5, FieldKind::DayOfMonth, "0")]
    #[case("* * * 13 *", CronDialect::Classic5, FieldKind::Month, "13")]
    #[case("* * * * 7", CronDialect::Classic5, FieldKind::DayOfWeek, "7")]
    #[case("60 * * * * *", CronDialect::Classic6, FieldKind::Second, "60")]
    #[case("0 60 * * * *", CronDialect::Classic6, FieldKind::Minute, "60")]
    fn test_out_of_bounds_field(
        #[case] raw: &str,
        #[case] dialect: CronDialect,
        #[case] kind: FieldKind,
        #[case] token: &str,
    ) {
        let (min, max) = kind.bounds();
        assert_eq!(
            validate(raw, dialect),
            Err(ValidationError::Field(ParseError::new(
                kind,
                token,
                ParseErrorReason::OutOfBounds { min, max }
            )))
        );
    }

    #[test]
    fn first_invalid_field_wins() {
        let err = validate("x 99 * * *", CronDialect::Classic5).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Field(ParseError::new(FieldKind::Minute, "x", ParseErrorReason::Malformed))
        );
    }

    #[test]
    fn fields_are_mapped_to_kinds() {
        let model = validate("1 2 3 4 5 6", CronDialect::Classic6).unwrap();
        assert_eq!(model.second().map(FieldSpec::first), Some(1));
        assert_eq!(model.minute().first(), 2);
        assert_eq!(model.hour().first(), 3);
        assert_eq!(model.day_of_month().first(), 4);
        assert_eq!(model.month().first(), 5);
        assert_eq!(model.day_of_week().first(), 6);

        let model = validate("2 3 4 5 6", CronDialect::Classic5).unwrap();
        assert!(model.second().is_none());
        assert_eq!(model.minute().first(), 2);
        assert_eq!(model.day_of_week().first(), 6);
        assert_eq!(model.fields().len(), 5);
    }

    #[rstest]
    #[case("@yearly", CronDialect::Classic5, "0 0 1 1 *")]
    #[case("@ANNUALLY", CronDialect::Classic5, "0 0 1 1 *")]
    #[case("@monthly", CronDialect::Classic5, "0 0 1 * *")]
    #[case("@weekly", CronDialect::Classic5, "0 0 * * 0")]
    #[case("@daily", CronDialect::Classic5, "0 0 * * *")]
    #[case("@midnight", CronDialect::Classic5, "0 0 * * *")]
    #[case("@hourly", CronDialect::Classic5, "0 * * * *")]
    #[case("@yearly", CronDialect::Classic6, "0 0 0 1 1 *")]
    #[case("@weekly", CronDialect::Classic6, "0 0 0 * * 0")]
    #[case("@hourly", CronDialect::Classic6, "0 0 * * * *")]
    fn test_macros(#[case] raw: &str, #[case] dialect: CronDialect, #[case] expanded: &str) {
        let from_macro = validate(raw, dialect).unwrap();
        let from_fields = validate(expanded, dialect).unwrap();
        assert_eq!(from_macro.fields(), from_fields.fields());
        assert_eq!(from_macro.text(), raw);
    }

    #[test]
    fn unknown_macro_is_rejected() {
        assert_eq!(
            validate("@sometimes", CronDialect::Classic5),
            Err(ValidationError::UnknownMacro("@sometimes".to_owned()))
        );
    }

    #[rstest]
    #[case("0 9 1 * 1", true)]
    #[case("0 9 * * 1", false)]
    #[case("0 9 1 * *", false)]
    #[case("0 9 1-31 * 1", false)]
    #[case("0 9 */2 * 1-5", true)]
    fn test_days_are_ored(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(validate(raw, CronDialect::Classic5).unwrap().days_are_ored(), expected);
    }

    #[rstest]
    #[case("crontab5", CronDialect::Classic5)]
    #[case("Classic5", CronDialect::Classic5)]
    #[case("5", CronDialect::Classic5)]
    #[case("crontab6", CronDialect::Classic6)]
    #[case(" 6 ", CronDialect::Classic6)]
    fn test_dialect_from_str(#[case] input: &str, #[case] expected: CronDialect) {
        assert_eq!(input.parse::<CronDialect>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<CronDialect>().unwrap(), expected);
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        assert!(matches!(
            "quartz".parse::<CronDialect>(),
            Err(CronError::InvalidDialect(name)) if name == "quartz"
        ));
    }
}
