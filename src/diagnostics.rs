//! Independent checks of the validated expression for surprising behavior.
//!
//! Checks never fail: each of them either reports a [`Diagnostic`] or stays silent.
//! Messages of the built-in checks are English, [`DiagnosticKind::summary`] gives a localized one-liner.

use crate::{expression::ExpressionModel, humanize::Locale, utils};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display};

/// Tag of the diagnostic, defines the order of diagnostics in a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Both day fields are restricted, so a day matches if either of them does.
    DomDowOrAmbiguity,
    /// Expression fires at every tick of its dialect.
    HighFrequency,
    /// Selected days of month never exist in the selected months.
    ImpossibleDate,
}

impl DiagnosticKind {
    /// Short warning text in the `locale`.
    pub const fn summary(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, Self::DomDowOrAmbiguity) => {
                "Day of month and day of week are ORed, it runs when either of them matches"
            }
            (Locale::En, Self::HighFrequency) => "This runs at every tick, make sure it's intended",
            (Locale::En, Self::ImpossibleDate) => "Selected days never occur in the selected months",
            (Locale::ZhCn, Self::DomDowOrAmbiguity) => "日期和星期字段同时设置时是 OR 关系（满足任一条件即执行）",
            (Locale::ZhCn, Self::HighFrequency) => "这将在每个时间单位执行一次，确定这是你想要的吗？",
            (Locale::ZhCn, Self::ImpossibleDate) => "所选日期在所选月份中不存在，永远不会执行",
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::DomDowOrAmbiguity => "dom-dow-or-ambiguity",
            DiagnosticKind::HighFrequency => "high-frequency",
            DiagnosticKind::ImpossibleDate => "impossible-date",
        };
        f.write_str(name)
    }
}

/// Classification of the expression with explanation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
}

impl Diagnostic {
    /// Constructs diagnostic of the `kind`.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Tag.
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Pure predicate over the expression.
pub trait Check {
    /// Returns diagnostic if the expression is affected.
    fn check(&self, model: &ExpressionModel) -> Option<Diagnostic>;
}

impl<F> Check for F
where
    F: Fn(&ExpressionModel) -> Option<Diagnostic>,
{
    fn check(&self, model: &ExpressionModel) -> Option<Diagnostic> {
        self(model)
    }
}

/// Reports [`DiagnosticKind::DomDowOrAmbiguity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DomDowOrAmbiguity;

impl Check for DomDowOrAmbiguity {
    fn check(&self, model: &ExpressionModel) -> Option<Diagnostic> {
        model.days_are_ored().then(|| {
            Diagnostic::new(
                DiagnosticKind::DomDowOrAmbiguity,
                format!(
                    "day of month '{}' and day of week '{}' are both restricted, it runs when either of them matches",
                    model.day_of_month(),
                    model.day_of_week()
                ),
            )
        })
    }
}

/// Reports [`DiagnosticKind::HighFrequency`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HighFrequency;

impl Check for HighFrequency {
    fn check(&self, model: &ExpressionModel) -> Option<Diagnostic> {
        if !model.fields().iter().all(|f| f.is_unrestricted()) {
            return None;
        }

        let tick = if model.dialect().has_seconds() {
            "second"
        } else {
            "minute"
        };
        Some(Diagnostic::new(
            DiagnosticKind::HighFrequency,
            format!("runs every {tick}, make sure it's intended"),
        ))
    }
}

/// Reports [`DiagnosticKind::ImpossibleDate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpossibleDate;

impl Check for ImpossibleDate {
    fn check(&self, model: &ExpressionModel) -> Option<Diagnostic> {
        // A restricted day of week always gives some days.
        if !model.day_of_week().is_unrestricted() {
            return None;
        }

        let possible = model.month().values().any(|month| {
            let max_day = utils::max_days_in_month(month.into()).unwrap_or(31);
            model.day_of_month().values().any(|day| u32::from(day) <= max_day)
        });

        (!possible).then(|| {
            Diagnostic::new(
                DiagnosticKind::ImpossibleDate,
                format!(
                    "day of month '{}' never occurs in month '{}'",
                    model.day_of_month(),
                    model.month()
                ),
            )
        })
    }
}

/// Built-in checks.
pub fn default_checks() -> [&'static dyn Check; 3] {
    [&DomDowOrAmbiguity, &HighFrequency, &ImpossibleDate]
}

/// Runs all the built-in checks.
pub fn diagnose(model: &ExpressionModel) -> BTreeSet<Diagnostic> {
    diagnose_with(model, &default_checks())
}

/// Runs provided `checks` only.
pub fn diagnose_with(model: &ExpressionModel, checks: &[&dyn Check]) -> BTreeSet<Diagnostic> {
    checks.iter().filter_map(|check| check.check(model)).collect()
}
