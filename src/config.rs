//! TOML configuration: defaults of the request and limits of the evaluation.
//!
//! ```toml
//! [defaults]
//! expression = "0 9 * * 1-5"
//! timezone = "Europe/Berlin"
//! dialect = "crontab5"
//! count = 10
//! locale = "en"
//!
//! [limits]
//! min_count = 1
//! max_count = 50
//! horizon_years = 5
//! overlap = "later"
//! ```

use crate::{
    expression::CronDialect,
    humanize::Locale,
    occurrence::{CountLimit, IterOptions, OverlapPolicy, DEFAULT_HORIZON_YEARS},
    request::{Request, DEFAULT_COUNT, DEFAULT_EXPRESSION},
    timezones::{resolve_timezone, DEFAULT_TIMEZONE},
    CronError, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Whole configuration, every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Values used when the request doesn't specify them.
    pub defaults: Defaults,
    /// Bounds of the evaluation.
    pub limits: Limits,
}

/// `[defaults]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Expression to evaluate.
    pub expression: String,
    /// IANA timezone identifier.
    pub timezone: String,
    /// Field layout.
    pub dialect: CronDialect,
    /// Number of occurrences.
    pub count: usize,
    /// Language of descriptions.
    pub locale: Locale,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            expression: DEFAULT_EXPRESSION.to_owned(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            dialect: CronDialect::default(),
            count: DEFAULT_COUNT,
            locale: Locale::default(),
        }
    }
}

/// `[limits]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Lower bound of the count, positive.
    pub min_count: usize,
    /// Upper bound of the count.
    pub max_count: usize,
    /// See [`IterOptions::horizon_years`].
    pub horizon_years: u16,
    /// See [`IterOptions::overlap`].
    pub overlap: OverlapPolicy,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_count: CountLimit::DEFAULT_MIN,
            max_count: CountLimit::DEFAULT_MAX,
            horizon_years: DEFAULT_HORIZON_YEARS,
            overlap: OverlapPolicy::default(),
        }
    }
}

impl Config {
    /// Reads and validates configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "load configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks consistency of the limits and the default timezone.
    pub fn validate(&self) -> Result<()> {
        self.count_limit()?;
        if self.limits.horizon_years == 0 {
            return Err(CronError::Config("horizon_years should be positive".to_owned()));
        }
        resolve_timezone(&self.defaults.timezone)?;
        Ok(())
    }

    /// Bounds of the requested count.
    pub fn count_limit(&self) -> Result<CountLimit> {
        CountLimit::new(self.limits.min_count, self.limits.max_count)
    }

    /// Options of the occurrence search.
    pub fn iter_options(&self) -> IterOptions {
        IterOptions {
            horizon_years: self.limits.horizon_years,
            overlap: self.limits.overlap,
        }
    }

    /// Request made of the defaults only.
    pub fn default_request(&self) -> Request {
        Request {
            expression: self.defaults.expression.clone(),
            timezone: self.defaults.timezone.clone(),
            dialect: self.defaults.dialect,
            count: self.defaults.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_content_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_request(), Request::default());
        assert_eq!(config.count_limit().unwrap(), CountLimit::default());
        assert_eq!(config.iter_options(), IterOptions::default());
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[defaults]
expression = "0 9 * * 1-5"
timezone = "Europe/Berlin"
dialect = "crontab6"
count = 20
locale = "zh-CN"

[limits]
min_count = 2
max_count = 100
horizon_years = 10
overlap = "earlier"
"#;
        let config = Config::from_toml_str(content).unwrap();

        assert_eq!(config.defaults.expression, "0 9 * * 1-5");
        assert_eq!(config.defaults.dialect, CronDialect::Classic6);
        assert_eq!(config.defaults.locale, Locale::ZhCn);
        assert_eq!(config.count_limit().unwrap().max(), 100);
        assert_eq!(
            config.iter_options(),
            IterOptions {
                horizon_years: 10,
                overlap: OverlapPolicy::Earlier
            }
        );
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::from_toml_str("[limits]\nmax_count = 20\n").unwrap();
        assert_eq!(config.limits.min_count, 1);
        assert_eq!(config.limits.max_count, 20);
        assert_eq!(config.defaults, Defaults::default());
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let config = Config::from_toml_str("[defaults]\nlocale = \"fr\"\n").unwrap();
        assert_eq!(config.defaults.locale, Locale::En);
    }

    #[rstest]
    #[case("[limits]\nmin_count = 0\n")]
    #[case("[limits]\nmin_count = 10\nmax_count = 5\n")]
    #[case("[limits]\nhorizon_years = 0\n")]
    fn inconsistent_limits_are_rejected(#[case] content: &str) {
        assert!(matches!(Config::from_toml_str(content), Err(CronError::Config(_))));
    }

    #[rstest]
    #[case("crontab5", CronDialect::Classic5)]
    #[case("classic5", CronDialect::Classic5)]
    #[case("5", CronDialect::Classic5)]
    #[case("crontab6", CronDialect::Classic6)]
    #[case("classic6", CronDialect::Classic6)]
    #[case("6", CronDialect::Classic6)]
    fn dialect_aliases(#[case] name: &str, #[case] expected: CronDialect) {
        let config = Config::from_toml_str(&format!("[defaults]\ndialect = \"{name}\"\n")).unwrap();
        assert_eq!(config.defaults.dialect, expected);
        assert_eq!(name.parse::<CronDialect>().unwrap(), expected);
    }

    #[rstest]
    #[case("[defaults]\ndialect = \"quartz\"\n")]
    #[case("[limits]\noverlap = \"both\"\n")]
    #[case("[unknown]\n")]
    #[case("[defaults\n")]
    fn malformed_content_is_rejected(#[case] content: &str) {
        assert!(matches!(Config::from_toml_str(content), Err(CronError::ConfigFormat(_))));
    }

    #[test]
    fn unknown_default_timezone_is_rejected() {
        assert!(matches!(
            Config::from_toml_str("[defaults]\ntimezone = \"Mars/Olympus\"\n"),
            Err(CronError::InvalidTimeZone(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[defaults]\ntimezone = \"Asia/Tokyo\"\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.defaults.timezone, "Asia/Tokyo");

        assert!(matches!(
            Config::load("/nonexistent/cron-guru.toml"),
            Err(CronError::Io(_))
        ));
    }
}
