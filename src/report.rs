use crate::{
    config::Config,
    diagnostics::{diagnose, Diagnostic},
    expression::ExpressionModel,
    humanize::{explain, Describe, FieldExplanation},
    occurrence::{iterate_with, Occurrence},
    request::Request,
    CronError, Result,
};
use chrono::{DateTime, TimeZone};
use std::collections::BTreeSet;
use tracing::debug;

/// Everything known about the requested expression.
#[derive(Debug, Clone)]
pub struct Report {
    /// Normalized expression text.
    pub normalized: String,
    /// Validated expression.
    pub model: ExpressionModel,
    /// Zone of the occurrences.
    pub timezone: String,
    /// One-line description, `None` if the humanizer failed.
    pub description: Option<String>,
    /// Field-by-field explanation.
    pub explanation: Vec<FieldExplanation>,
    /// Upcoming occurrences, strictly after the start point.
    pub occurrences: Vec<Occurrence>,
    /// `true` if there are fewer occurrences than requested because the search horizon was exhausted.
    pub exhausted: bool,
    /// Findings of the built-in checks.
    pub diagnostics: BTreeSet<Diagnostic>,
}

impl Report {
    /// Validates request, collects occurrences after `from`, runs diagnostics and describes expression.
    ///
    /// Validation and timezone errors are returned, humanizer errors only make description empty.
    pub fn build<T: TimeZone>(
        request: &Request,
        config: &Config,
        from: &DateTime<T>,
        humanizer: &dyn Describe,
    ) -> Result<Self> {
        let model = request.validate()?;
        let count = config.count_limit()?.clamp(request.count);

        let mut occurrences = Vec::with_capacity(count);
        let mut exhausted = false;
        for occurrence in iterate_with(&model, &request.timezone, from, config.iter_options())?.take(count) {
            match occurrence {
                Ok(occurrence) => occurrences.push(occurrence),
                Err(CronError::NoOccurrenceFound { .. }) => {
                    exhausted = true;
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        let locale = config.defaults.locale;
        let description = humanizer
            .describe(&model, locale)
            .inspect_err(|err| debug!(error = %err, "no description available"))
            .ok();

        Ok(Self {
            normalized: model.text().to_owned(),
            timezone: request.timezone.trim().to_owned(),
            description,
            explanation: explain(&model, locale),
            occurrences,
            exhausted,
            diagnostics: diagnose(&model),
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::DiagnosticKind,
        humanize::{HumanizeError, Locale, TemplateHumanizer},
        CronDialect,
    };
    use chrono::Utc;

    struct Broken;

    impl Describe for Broken {
        fn describe(&self, _model: &ExpressionModel, locale: Locale) -> Result<String, HumanizeError> {
            Err(HumanizeError::UnsupportedLocale(locale))
        }
    }

    fn from() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn request(expression: &str, count: usize) -> Request {
        Request {
            expression: expression.to_owned(),
            count,
            ..Default::default()
        }
    }

    #[test]
    fn full_report() {
        let report = Report::build(
            &request("  0   9 1 * 1 ", 3),
            &Config::default(),
            &from(),
            &TemplateHumanizer,
        )
        .unwrap();

        assert_eq!(report.normalized, "0 9 1 * 1");
        assert_eq!(report.model.dialect(), CronDialect::Classic5);
        assert_eq!(report.timezone, "UTC");
        assert_eq!(
            report.description.as_deref(),
            Some("At minute 0, At hour 9, On day 1 or Monday")
        );
        assert_eq!(report.explanation.len(), 5);
        assert_eq!(report.occurrences.len(), 3);
        assert!(!report.exhausted);
        assert_eq!(
            report.diagnostics.iter().map(Diagnostic::kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::DomDowOrAmbiguity]
        );
    }

    #[test]
    fn humanizer_failure_is_not_fatal() {
        let report = Report::build(&request("*/5 * * * *", 3), &Config::default(), &from(), &Broken).unwrap();
        assert!(report.description.is_none());
        assert_eq!(report.occurrences.len(), 3);
    }

    #[test]
    fn count_is_clamped_by_config() {
        let config = Config::from_toml_str("[limits]\nmax_count = 4\n").unwrap();
        let report = Report::build(&request("* * * * *", 100), &config, &from(), &TemplateHumanizer).unwrap();
        assert_eq!(report.occurrences.len(), 4);
    }

    #[test]
    fn impossible_date_is_reported() {
        let report = Report::build(&request("0 0 30 2 *", 5), &Config::default(), &from(), &TemplateHumanizer).unwrap();

        assert!(report.occurrences.is_empty());
        assert!(report.exhausted);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.kind() == DiagnosticKind::ImpossibleDate));
    }

    #[test]
    fn errors_are_propagated() {
        let result = Report::build(&request("61 * * * *", 3), &Config::default(), &from(), &TemplateHumanizer);
        assert!(matches!(result, Err(CronError::Validation(_))));

        let mut bad_zone = request("* * * * *", 3);
        bad_zone.timezone = "Mars/Olympus".to_owned();
        let result = Report::build(&bad_zone, &Config::default(), &from(), &TemplateHumanizer);
        assert!(matches!(result, Err(CronError::InvalidTimeZone(_))));
    }
}
