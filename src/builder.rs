use crate::{
    error::ValidationError,
    expression::{validate, CronDialect, ExpressionModel},
    field::FieldKind,
};
use std::{collections::BTreeMap, fmt::Display};

/// Structured way to define a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FieldMode {
    /// `*`
    #[default]
    Every,
    /// `*/S`, zero step means [`FieldMode::Every`].
    Interval(u32),
    /// `A-B`, ends are swapped if needed.
    Range(u8, u8),
    /// `a,b,c`, sorted and de-duplicated; empty list means [`FieldMode::Every`].
    Specific(Vec<u8>),
}

impl Display for FieldMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldMode::Every | FieldMode::Interval(0) => write!(f, "*"),
            FieldMode::Interval(step) => write!(f, "*/{step}"),
            FieldMode::Range(start, end) => write!(f, "{}-{}", start.min(end), start.max(end)),
            FieldMode::Specific(values) if values.is_empty() => write!(f, "*"),
            FieldMode::Specific(values) => {
                let mut values = values.clone();
                values.sort_unstable();
                values.dedup();
                let values = values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
                write!(f, "{}", values.join(","))
            }
        }
    }
}

/// Composes expression field by field.
///
/// ```
/// use cron_guru::{CronDialect, ExpressionBuilder, FieldKind, FieldMode};
///
/// let mut builder = ExpressionBuilder::new(CronDialect::Classic5);
/// builder
///     .set(FieldKind::Minute, FieldMode::Interval(15))
///     .set(FieldKind::Hour, FieldMode::Range(9, 17));
///
/// assert_eq!(builder.pattern(), "*/15 9-17 * * *");
/// assert!(builder.build().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionBuilder {
    dialect: CronDialect,
    modes: BTreeMap<FieldKind, FieldMode>,
}

impl ExpressionBuilder {
    /// Constructs builder with every field set to [`FieldMode::Every`].
    pub fn new(dialect: CronDialect) -> Self {
        Self {
            dialect,
            modes: BTreeMap::new(),
        }
    }

    /// Sets the mode of the field.
    ///
    /// Kinds which the dialect doesn't have (seconds of [`CronDialect::Classic5`]) are kept but not rendered.
    pub fn set(&mut self, kind: FieldKind, mode: FieldMode) -> &mut Self {
        self.modes.insert(kind, mode);
        self
    }

    /// Current mode of the field.
    pub fn mode(&self, kind: FieldKind) -> &FieldMode {
        static EVERY: FieldMode = FieldMode::Every;
        self.modes.get(&kind).unwrap_or(&EVERY)
    }

    /// Dialect of the resulting expression.
    pub fn dialect(&self) -> CronDialect {
        self.dialect
    }

    /// Expression text, not validated.
    pub fn pattern(&self) -> String {
        self.dialect
            .kinds()
            .iter()
            .map(|kind| self.mode(*kind).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders and validates the expression.
    ///
    /// Fails if some value is outside of its field bounds.
    pub fn build(&self) -> Result<ExpressionModel, ValidationError> {
        validate(&self.pattern(), self.dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, ParseErrorReason};
    use rstest::rstest;

    #[rstest]
    #[case(FieldMode::Every, "*")]
    #[case(FieldMode::Interval(0), "*")]
    #[case(FieldMode::Interval(5), "*/5")]
    #[case(FieldMode::Range(9, 17), "9-17")]
    #[case(FieldMode::Range(17, 9), "9-17")]
    #[case(FieldMode::Specific(vec![]), "*")]
    #[case(FieldMode::Specific(vec![30, 0, 15, 0]), "0,15,30")]
    fn test_mode_display(#[case] mode: FieldMode, #[case] expected: &str) {
        assert_eq!(mode.to_string(), expected);
    }

    #[test]
    fn default_is_every_minute() {
        let builder = ExpressionBuilder::new(CronDialect::Classic5);
        assert_eq!(builder.pattern(), "* * * * *");
        assert_eq!(builder.mode(FieldKind::Hour), &FieldMode::Every);

        let builder = ExpressionBuilder::new(CronDialect::Classic6);
        assert_eq!(builder.pattern(), "* * * * * *");
    }

    #[test]
    fn builds_every_field() {
        let mut builder = ExpressionBuilder::new(CronDialect::Classic6);
        builder
            .set(FieldKind::Second, FieldMode::Specific(vec![30]))
            .set(FieldKind::Minute, FieldMode::Interval(10))
            .set(FieldKind::Hour, FieldMode::Range(8, 18))
            .set(FieldKind::DayOfMonth, FieldMode::Specific(vec![15, 1]))
            .set(FieldKind::Month, FieldMode::Interval(3))
            .set(FieldKind::DayOfWeek, FieldMode::Range(1, 5));

        let model = builder.build().unwrap();
        assert_eq!(model.text(), "30 */10 8-18 1,15 */3 1-5");
        assert_eq!(model.dialect(), CronDialect::Classic6);
    }

    #[test]
    fn seconds_are_ignored_by_classic5() {
        let mut builder = ExpressionBuilder::new(CronDialect::Classic5);
        builder.set(FieldKind::Second, FieldMode::Specific(vec![30]));
        assert_eq!(builder.pattern(), "* * * * *");
    }

    #[test]
    fn out_of_bounds_value_fails() {
        let mut builder = ExpressionBuilder::new(CronDialect::Classic5);
        builder.set(FieldKind::DayOfWeek, FieldMode::Specific(vec![7]));

        assert_eq!(
            builder.build(),
            Err(ValidationError::Field(ParseError::new(
                FieldKind::DayOfWeek,
                "7",
                ParseErrorReason::OutOfBounds { min: 0, max: 6 }
            )))
        );
    }

    #[test]
    fn any_in_bounds_modes_validate() {
        for kind in CronDialect::Classic6.kinds() {
            let (min, max) = kind.bounds();
            for mode in [
                FieldMode::Every,
                FieldMode::Interval(1),
                FieldMode::Interval(u32::from(max) + 10),
                FieldMode::Range(max, min),
                FieldMode::Specific(vec![max, min, max]),
            ] {
                let mut builder = ExpressionBuilder::new(CronDialect::Classic6);
                builder.set(*kind, mode.clone());
                assert!(builder.build().is_ok(), "kind = {kind:?}, mode = {mode:?}");
            }
        }
    }
}
