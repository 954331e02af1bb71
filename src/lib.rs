//! Cron expression validator, explainer and timezone-aware occurrence generator.
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! This crate is intended to:
//! - validate classic cron expressions with precise, field-level error messages;
//! - generate upcoming fire times in any IANA timezone, correctly across DST transitions;
//! - point out surprising expressions, like ones where day of month and day of week are ORed;
//! - describe expressions in plain English or Chinese.
//!
//! _This is not a cron jobs scheduler or runner._
//!
//! ## Cron expression format
//!
//! Two dialects are supported:
//! - [`CronDialect::Classic5`] (`crontab5`): minutes, hours, days of month, months and days of week;
//! - [`CronDialect::Classic6`] (`crontab6`): the same with leading seconds.
//!
//! | Field        | Allowed values  | Allowed special characters |
//! |--------------|-----------------|----------------------------|
//! | Seconds      | 0-59            | * , - /                    |
//! | Minutes      | 0-59            | * , - /                    |
//! | Hours        | 0-23            | * , - /                    |
//! | Day of Month | 1-31            | * , - /                    |
//! | Month        | 1-12 or JAN-DEC | * , - /                    |
//! | Day of Week  | 0-6 or SUN-SAT  | * , - /                    |
//!
//! Patterns meanings:
//! - `*` - each possible value, i.e. `0,1,2,...,59` for minutes;
//! - `,` - list of values or patterns, i.e. `1,7,12`, `SUN,FRI`;
//! - `-` - range of values, i.e. `0-15`, `JAN-MAR`;
//! - `/` - repeating values, i.e. `*/12`, `10/5`, `30-59/2`.
//!
//! If both day of month and day of week are restricted, a day matches when _either_ of them does,
//! as classic crontab does. Otherwise, the restricted one decides.
//!
//! Short aliases are expanded for the selected dialect:
//!
//! | Alias                      | Classic5      |
//! |----------------------------|---------------|
//! | `@yearly` (or `@annually`) | 0 0 1 1 *     |
//! | `@monthly`                 | 0 0 1 * *     |
//! | `@weekly`                  | 0 0 * * 0     |
//! | `@daily` (or `@midnight`)  | 0 0 * * *     |
//! | `@hourly`                  | 0 * * * *     |
//!
//! ## How to use
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use cron_guru::{diagnose, iterate, validate, CronDialect, Result};
//!
//! fn upcoming() -> Result<()> {
//!     let model = validate("*/5 * * * *", CronDialect::Classic5)?;
//!     let from: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
//!
//!     let runs = iterate(&model, "UTC", &from)?
//!         .take(3)
//!         .map(|o| o.map(|o| o.instant().to_rfc3339()))
//!         .collect::<Result<Vec<_>>>()?;
//!     assert_eq!(
//!         runs,
//!         ["2024-01-01T00:05:00+00:00", "2024-01-01T00:10:00+00:00", "2024-01-01T00:15:00+00:00"]
//!     );
//!     assert!(diagnose(&model).is_empty());
//!
//!     Ok(())
//! }
//! # upcoming().unwrap();
//! ```
//!
//! ### Timezones and DST
//!
//! Occurrences are searched in civil time of the requested zone. Civil times skipped by a
//! spring-forward transition never fire; civil times repeated by a fall-back transition fire once,
//! [`OverlapPolicy`] defines which of the two instants is used.
//!
//! # Feature flags
//! * `cli` (default): `cron-guru` command line tool.

/// Calendar month grid of occurrences.
pub mod calendar;
/// Structured expression builder.
pub mod builder;
pub mod config;
pub mod diagnostics;
/// Crate specific Error implementation.
pub mod error;
/// Expression normalization and validation.
pub mod expression;
/// Single field parser.
pub mod field;
pub mod humanize;
/// DST-safe occurrence iterator.
pub mod occurrence;
/// Aggregated evaluation result.
pub mod report;
/// Shareable request parameters.
pub mod request;
pub mod timezones;
mod utils;

// Re-export of public entities.
pub use builder::{ExpressionBuilder, FieldMode};
pub use calendar::MonthGrid;
pub use config::Config;
pub use diagnostics::{diagnose, diagnose_with, Check, Diagnostic, DiagnosticKind};
pub use error::{CronError, ParseError, ParseErrorReason, ValidationError};
pub use expression::{normalize, validate, CronDialect, ExpressionModel};
pub use field::{FieldKind, FieldSpec, StepBase, Term};
pub use humanize::{explain, Describe, HumanizeError, Locale, TemplateHumanizer};
pub use occurrence::{
    iterate, iterate_with, next_runs, next_runs_with, CountLimit, IterOptions, Occurrence, Occurrences, OverlapPolicy,
};
pub use report::Report;
pub use request::Request;
pub use timezones::resolve_timezone;

/// Convenient alias for `Result`.
pub type Result<T, E = CronError> = std::result::Result<T, E>;
