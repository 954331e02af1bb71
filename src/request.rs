use crate::{
    expression::{validate, CronDialect, ExpressionModel},
    timezones::DEFAULT_TIMEZONE,
    CronError, Result,
};
use serde::{Deserialize, Serialize};
use tracing::trace;
use url::form_urlencoded;

/// Expression shown when nothing is provided.
pub const DEFAULT_EXPRESSION: &str = "*/5 * * * *";
/// Number of occurrences shown when nothing is provided.
pub const DEFAULT_COUNT: usize = 10;

/// Shareable set of parameters: what to evaluate and where.
///
/// Encodes to a URL query with `expr`, `tz`, `dialect` and `count` keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    /// Raw cron expression.
    pub expression: String,
    /// IANA timezone identifier.
    pub timezone: String,
    /// Field layout.
    pub dialect: CronDialect,
    /// Number of occurrences, not clamped yet.
    pub count: usize,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            expression: DEFAULT_EXPRESSION.to_owned(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            dialect: CronDialect::default(),
            count: DEFAULT_COUNT,
        }
    }
}

impl Request {
    /// Parses URL query, with or without leading `?`, missing keys take [`Request::default`] values.
    pub fn from_query(query: &str) -> Result<Self> {
        Self::from_query_with(query, Self::default())
    }

    /// Parses URL query, missing keys take values from `defaults`.
    ///
    /// Unknown keys, like `lang` or `theme`, are ignored.
    pub fn from_query_with(query: &str, defaults: Self) -> Result<Self> {
        let query = query.trim().trim_start_matches('?');
        let mut request = defaults;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "expr" => request.expression = value.into_owned(),
                "tz" => request.timezone = value.into_owned(),
                "dialect" => {
                    request.dialect = value
                        .parse()
                        .map_err(|_| invalid_query(&key, &value))?;
                }
                "count" => {
                    request.count = value
                        .trim()
                        .parse()
                        .map_err(|_| invalid_query(&key, &value))?;
                }
                _ => trace!(%key, "ignore query parameter"),
            }
        }

        Ok(request)
    }

    /// Encodes request as URL query, without leading `?`.
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("expr", &self.expression)
            .append_pair("tz", &self.timezone)
            .append_pair("dialect", self.dialect.as_str())
            .append_pair("count", &self.count.to_string())
            .finish()
    }

    /// Validates expression of the request.
    pub fn validate(&self) -> Result<ExpressionModel> {
        Ok(validate(&self.expression, self.dialect)?)
    }
}

fn invalid_query(key: &str, value: &str) -> CronError {
    CronError::InvalidQuery {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}
