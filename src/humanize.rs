//! Human-readable rendering of the expression: a one-line sentence and field-by-field explanation.

use crate::{
    expression::ExpressionModel,
    field::{FieldKind, FieldSpec, StepBase, Term},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

const EN_DAYS: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];
const ZH_DAYS: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];
const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const ZH_MONTHS: [&str; 12] = [
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];

/// Language of the generated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    ZhCn,
}

impl Locale {
    /// Picks locale by language tag like `en-US` or `zh-CN`, unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        if tag == "zh" || tag.starts_with("zh-") || tag.starts_with("zh_") {
            Self::ZhCn
        } else {
            Self::En
        }
    }

    /// Canonical language tag.
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::ZhCn => "zh-CN",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::En => ", ",
            Self::ZhCn => "，",
        }
    }
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.as_tag().to_owned()
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Failure of the [`Describe`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HumanizeError {
    /// Implementation has no text for the locale.
    #[error("locale {0} is not supported")]
    UnsupportedLocale(Locale),
    /// Implementation can't produce text for the expression.
    #[error("unable to describe '{expression}': {reason}")]
    Unavailable {
        /// Normalized expression.
        expression: String,
        /// Cause.
        reason: String,
    },
}

/// Renders validated expression as a sentence.
pub trait Describe {
    /// Returns description of `model` in `locale`.
    fn describe(&self, model: &ExpressionModel, locale: Locale) -> Result<String, HumanizeError>;
}

/// Built-in template based [`Describe`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateHumanizer;

impl Describe for TemplateHumanizer {
    fn describe(&self, model: &ExpressionModel, locale: Locale) -> Result<String, HumanizeError> {
        Ok(sentence(model, locale))
    }
}

/// Meaning of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldExplanation {
    /// Kind of the field.
    pub kind: FieldKind,
    /// Localized field name.
    pub label: &'static str,
    /// Field pattern with resolved aliases.
    pub pattern: String,
    /// Localized meaning.
    pub meaning: String,
    /// The first accepted values, like `0, 5, 10, 15, 20...`.
    pub samples: String,
}

/// Explains every field of the expression in positional order.
pub fn explain(model: &ExpressionModel, locale: Locale) -> Vec<FieldExplanation> {
    model
        .fields()
        .iter()
        .map(|field| FieldExplanation {
            kind: field.kind(),
            label: label(field.kind(), locale),
            pattern: field.to_string(),
            meaning: meaning(field, locale),
            samples: samples(field, locale),
        })
        .collect()
}

fn samples(field: &FieldSpec, locale: Locale) -> String {
    const SAMPLES: usize = 5;

    let kind = field.kind();
    let shown = field
        .values()
        .take(SAMPLES)
        .map(|v| name(kind, v, locale))
        .collect::<Vec<_>>()
        .join(", ");
    if field.len() > SAMPLES {
        format!("{shown}...")
    } else {
        shown
    }
}

fn sentence(model: &ExpressionModel, locale: Locale) -> String {
    let has_seconds = model.dialect().has_seconds();
    if model.fields().iter().all(FieldSpec::is_unrestricted) {
        return every(if has_seconds { FieldKind::Second } else { FieldKind::Minute }, locale).to_owned();
    }

    let (minute, hour, dow) = (model.minute(), model.hour(), model.day_of_week());
    let second = match model.second() {
        Some(field) => single(field),
        None => Some(0),
    };
    let dates_unrestricted = model.day_of_month().is_unrestricted() && model.month().is_unrestricted();

    if second == Some(0) && dates_unrestricted && dow.is_unrestricted() && hour.is_unrestricted() {
        if let [Term::Step(StepBase::All, _)] = minute.terms() {
            return meaning(minute, locale);
        }
        if let Some(m) = single(minute) {
            return match locale {
                Locale::En => format!("At minute {m} of every hour"),
                Locale::ZhCn => format!("每小时的第{m}分钟"),
            };
        }
    }

    if let (Some(s), Some(m), Some(h)) = (second, single(minute), single(hour)) {
        if dates_unrestricted {
            let time = if has_seconds && s != 0 {
                format!("{h:02}:{m:02}:{s:02}")
            } else {
                format!("{h:02}:{m:02}")
            };
            return match (locale, dow.is_unrestricted()) {
                (Locale::En, true) => format!("At {time}"),
                (Locale::En, false) => format!("At {time}, {}", meaning(dow, locale)),
                (Locale::ZhCn, true) => format!("每天 {time}"),
                (Locale::ZhCn, false) => format!("{} {time}", meaning(dow, locale)),
            };
        }
    }

    let mut parts = [model.second(), Some(minute), Some(hour)]
        .into_iter()
        .flatten()
        .filter(|field| !field.is_unrestricted())
        .map(|field| meaning(field, locale))
        .collect::<Vec<_>>();

    let (dom, dow) = (model.day_of_month(), model.day_of_week());
    if model.days_are_ored() {
        let or = match locale {
            Locale::En => " or ",
            Locale::ZhCn => "或",
        };
        parts.push(format!("{}{or}{}", meaning(dom, locale), meaning(dow, locale)));
    } else if !dom.is_unrestricted() {
        parts.push(meaning(dom, locale));
    } else if !dow.is_unrestricted() {
        parts.push(meaning(dow, locale));
    }

    if !model.month().is_unrestricted() {
        parts.push(meaning(model.month(), locale));
    }

    parts.join(locale.separator())
}

fn single(field: &FieldSpec) -> Option<u8> {
    (field.len() == 1).then(|| field.first())
}

fn meaning(field: &FieldSpec, locale: Locale) -> String {
    let kind = field.kind();
    if field.is_unrestricted() {
        return every(kind, locale).to_owned();
    }

    match field.terms() {
        [Term::Step(StepBase::All, step)] if kind != FieldKind::DayOfWeek => step_phrase(kind, *step, locale),
        [Term::Value(value)] => value_phrase(kind, *value, locale),
        [Term::Range(start, end)] => range_phrase(kind, *start, *end, locale),
        _ => list_phrase(field, locale),
    }
}

fn name(kind: FieldKind, value: u8, locale: Locale) -> String {
    let index = usize::from(value);
    let name = match (kind, locale) {
        (FieldKind::DayOfWeek, Locale::En) => EN_DAYS.get(index),
        (FieldKind::DayOfWeek, Locale::ZhCn) => ZH_DAYS.get(index),
        (FieldKind::Month, Locale::En) => index.checked_sub(1).and_then(|i| EN_MONTHS.get(i)),
        (FieldKind::Month, Locale::ZhCn) => index.checked_sub(1).and_then(|i| ZH_MONTHS.get(i)),
        _ => None,
    };

    name.map_or_else(|| value.to_string(), |name| (*name).to_owned())
}

fn is_named(kind: FieldKind) -> bool {
    matches!(kind, FieldKind::Month | FieldKind::DayOfWeek)
}

fn label(kind: FieldKind, locale: Locale) -> &'static str {
    match (locale, kind) {
        (Locale::En, FieldKind::Second) => "Second",
        (Locale::En, FieldKind::Minute) => "Minute",
        (Locale::En, FieldKind::Hour) => "Hour",
        (Locale::En, FieldKind::DayOfMonth) => "Day of month",
        (Locale::En, FieldKind::Month) => "Month",
        (Locale::En, FieldKind::DayOfWeek) => "Day of week",
        (Locale::ZhCn, FieldKind::Second) => "秒",
        (Locale::ZhCn, FieldKind::Minute) => "分钟",
        (Locale::ZhCn, FieldKind::Hour) => "小时",
        (Locale::ZhCn, FieldKind::DayOfMonth) => "日期",
        (Locale::ZhCn, FieldKind::Month) => "月份",
        (Locale::ZhCn, FieldKind::DayOfWeek) => "星期",
    }
}

fn every(kind: FieldKind, locale: Locale) -> &'static str {
    match (locale, kind) {
        (Locale::En, FieldKind::Second) => "Every second",
        (Locale::En, FieldKind::Minute) => "Every minute",
        (Locale::En, FieldKind::Hour) => "Every hour",
        (Locale::En, FieldKind::DayOfMonth) => "Every day",
        (Locale::En, FieldKind::Month) => "Every month",
        (Locale::En, FieldKind::DayOfWeek) => "Every day of week",
        (Locale::ZhCn, FieldKind::Second) => "每秒",
        (Locale::ZhCn, FieldKind::Minute) => "每分钟",
        (Locale::ZhCn, FieldKind::Hour) => "每小时",
        (Locale::ZhCn, FieldKind::DayOfMonth) => "每天",
        (Locale::ZhCn, FieldKind::Month) => "每月",
        (Locale::ZhCn, FieldKind::DayOfWeek) => "每天（任意星期）",
    }
}

fn step_phrase(kind: FieldKind, step: u32, locale: Locale) -> String {
    match locale {
        Locale::En => {
            let unit = match kind {
                FieldKind::Second => "second",
                FieldKind::Minute => "minute",
                FieldKind::Hour => "hour",
                FieldKind::DayOfMonth | FieldKind::DayOfWeek => "day",
                FieldKind::Month => "month",
            };
            let plural = if step == 1 { "" } else { "s" };
            format!("Every {step} {unit}{plural}")
        }
        Locale::ZhCn => {
            let unit = match kind {
                FieldKind::Second => "秒",
                FieldKind::Minute => "分钟",
                FieldKind::Hour => "小时",
                FieldKind::DayOfMonth | FieldKind::DayOfWeek => "天",
                FieldKind::Month => "个月",
            };
            format!("每{step}{unit}")
        }
    }
}

fn value_phrase(kind: FieldKind, value: u8, locale: Locale) -> String {
    if is_named(kind) {
        return name(kind, value, locale);
    }

    match (locale, kind) {
        (Locale::En, FieldKind::Second) => format!("At second {value}"),
        (Locale::En, FieldKind::Minute) => format!("At minute {value}"),
        (Locale::En, FieldKind::Hour) => format!("At hour {value}"),
        (Locale::En, _) => format!("On day {value}"),
        (Locale::ZhCn, FieldKind::Second) => format!("第{value}秒"),
        (Locale::ZhCn, FieldKind::Minute) => format!("第{value}分钟"),
        (Locale::ZhCn, FieldKind::Hour) => format!("{value}点"),
        (Locale::ZhCn, _) => format!("每月{value}号"),
    }
}

fn range_phrase(kind: FieldKind, start: u8, end: u8, locale: Locale) -> String {
    if is_named(kind) {
        let (start, end) = (name(kind, start, locale), name(kind, end, locale));
        return match locale {
            Locale::En => format!("{start} through {end}"),
            Locale::ZhCn => format!("{start}到{end}"),
        };
    }

    match locale {
        Locale::En => {
            let units = match kind {
                FieldKind::Second => "Seconds",
                FieldKind::Minute => "Minutes",
                FieldKind::Hour => "Hours",
                _ => "Days",
            };
            format!("{units} {start} to {end}")
        }
        Locale::ZhCn => {
            let unit = match kind {
                FieldKind::Second => "秒",
                FieldKind::Minute => "分",
                FieldKind::Hour => "点",
                _ => "号",
            };
            format!("{start}到{end}{unit}")
        }
    }
}

fn list_phrase(field: &FieldSpec, locale: Locale) -> String {
    let kind = field.kind();
    if is_named(kind) {
        let separator = match locale {
            Locale::En => ", ",
            Locale::ZhCn => "、",
        };
        return field
            .values()
            .map(|v| name(kind, v, locale))
            .collect::<Vec<_>>()
            .join(separator);
    }

    let values = field.values().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
    match locale {
        Locale::En => {
            let units = match kind {
                FieldKind::Second => "Seconds",
                FieldKind::Minute => "Minutes",
                FieldKind::Hour => "Hours",
                _ => "Days",
            };
            format!("{units}: {values}")
        }
        Locale::ZhCn => format!("{}：{values}", label(kind, locale)),
    }
}
