use crate::{expression::CronDialect, field::FieldKind};
use thiserror::Error;

/// Crate specific Errors implementation.
#[derive(Debug, Error)]
pub enum CronError {
    /// Expression didn't pass validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Timezone identifier isn't known to the timezone database.
    #[error("invalid timezone: {0}")]
    InvalidTimeZone(String),
    /// Search for the next occurrence exhausted its horizon.
    #[error("no occurrence found within {horizon_years} years")]
    NoOccurrenceFound {
        /// Size of the searched window.
        horizon_years: u16,
    },
    /// Unknown dialect name.
    #[error("invalid dialect: {0}")]
    InvalidDialect(String),
    /// Malformed share query.
    #[error("invalid query parameter {key}: {value}")]
    InvalidQuery {
        /// Query key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// Inconsistent configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Configuration file can't be parsed.
    #[error("unable to parse configuration: {0}")]
    ConfigFormat(#[from] toml::de::Error),
    /// Configuration file can't be read.
    #[error("unable to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors of the whole expression, the first one encountered wins.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum ValidationError {
    /// Nothing but whitespace provided.
    #[error("empty expression")]
    Empty,
    /// Expression starts with `@` but it's not a known macro.
    #[error("unknown macro: {0}")]
    UnknownMacro(String),
    /// Wrong number of fields for the dialect.
    #[error("expected {expected} fields ({}) but got {actual}", .dialect.layout())]
    FieldCountMismatch {
        /// Selected dialect.
        dialect: CronDialect,
        /// Dialect arity.
        expected: usize,
        /// Number of fields in the input.
        actual: usize,
    },
    /// One of the fields is invalid.
    #[error(transparent)]
    Field(#[from] ParseError),
}

/// Error parsing a single field pattern.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[error("invalid {kind} value '{token}': {reason}")]
pub struct ParseError {
    /// Field where the error was found.
    pub kind: FieldKind,
    /// Offending part of the pattern.
    pub token: String,
    /// What's wrong with the token.
    pub reason: ParseErrorReason,
}

impl ParseError {
    pub(crate) fn new(kind: FieldKind, token: impl Into<String>, reason: ParseErrorReason) -> Self {
        Self {
            kind,
            token: token.into(),
            reason,
        }
    }
}

/// Particular reason of the [`ParseError`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorReason {
    /// Empty pattern or empty list member.
    #[error("empty value")]
    Empty,
    /// Not a number, alias or known construction.
    #[error("malformed value")]
    Malformed,
    /// Value is outside the field bounds.
    #[error("out of range {min}-{max}")]
    OutOfBounds {
        /// Lower bound, inclusive.
        min: u8,
        /// Upper bound, inclusive.
        max: u8,
    },
    /// Step is zero or negative.
    #[error("step should be positive")]
    NonPositiveStep,
    /// Range start is greater than its end.
    #[error("range start is greater than its end")]
    InvertedRange,
}
