use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use cron_guru::{
    timezones::{offset_label, resolve_timezone},
    Config, CronDialect, Locale, MonthGrid, Report, Request, Result, TemplateHumanizer,
};
use std::{path::PathBuf, process::ExitCode};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cron-guru", version)]
#[command(about = "Validates, explains and previews cron expressions", long_about = None)]
struct Cli {
    /// Cron expression, like "*/5 * * * *" or "@daily".
    #[arg(required_unless_present = "query")]
    expression: Option<String>,

    /// IANA timezone of the occurrences.
    #[arg(long)]
    tz: Option<String>,

    /// Field layout: crontab5 or crontab6.
    #[arg(long)]
    dialect: Option<CronDialect>,

    /// Number of occurrences to show.
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Start point in RFC 3339 format, now by default.
    #[arg(long)]
    from: Option<DateTime<FixedOffset>>,

    /// Language of descriptions: en or zh-CN.
    #[arg(long)]
    locale: Option<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Share query, like "expr=0+9+*+*+1-5&tz=Asia%2FTokyo".
    #[arg(long)]
    query: Option<String>,

    /// Explain every field.
    #[arg(long)]
    explain: bool,

    /// Show calendar of the first occurrences' month.
    #[arg(long)]
    calendar: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "evaluation failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: bool) {
    let directive = if verbose { "cron_guru=debug" } else { "cron_guru=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(locale) = &cli.locale {
        config.defaults.locale = Locale::from_tag(locale);
    }

    let request = build_request(&cli, &config)?;
    debug!(query = %request.to_query(), "request");

    let from = cli.from.unwrap_or_else(|| Utc::now().fixed_offset());
    let report = Report::build(&request, &config, &from, &TemplateHumanizer)?;

    print_report(&report, &request, &from, config.defaults.locale);
    if cli.explain {
        println!();
        for field in &report.explanation {
            println!("  {:<14}{:<12}{:<28}{}", field.label, field.pattern, field.meaning, field.samples);
        }
    }
    if cli.calendar {
        if let Some(grid) = MonthGrid::from_occurrences(&report.occurrences) {
            println!();
            print!("{grid}");
        }
    }

    Ok(())
}

/// Configuration defaults, then share query, then explicit options.
fn build_request(cli: &Cli, config: &Config) -> Result<Request> {
    let mut request = match &cli.query {
        Some(query) => Request::from_query_with(query, config.default_request())?,
        None => config.default_request(),
    };

    if let Some(expression) = &cli.expression {
        request.expression = expression.clone();
    }
    if let Some(tz) = &cli.tz {
        request.timezone = tz.clone();
    }
    if let Some(dialect) = cli.dialect {
        request.dialect = dialect;
    }
    if let Some(count) = cli.count {
        request.count = count;
    }

    Ok(request)
}

fn print_report(report: &Report, request: &Request, from: &DateTime<FixedOffset>, locale: Locale) {
    let offset = resolve_timezone(&report.timezone)
        .map(|tz| offset_label(tz, &from.with_timezone(&Utc)))
        .unwrap_or_default();

    println!("Expression: {} ({})", report.normalized, report.model.dialect());
    println!("Timezone:   {} ({offset})", report.timezone);
    if let Some(description) = &report.description {
        println!("Meaning:    {description}");
    }
    println!("Share:      ?{}", request.to_query());

    println!();
    println!("Next {} runs:", report.occurrences.len());
    for occurrence in &report.occurrences {
        println!("  {occurrence}");
    }
    if report.exhausted {
        println!("  (no more runs in the search window)");
    }

    if !report.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diagnostic in &report.diagnostics {
            match locale {
                Locale::En => println!("  {diagnostic}"),
                Locale::ZhCn => println!("  {}: {}", diagnostic.kind(), diagnostic.kind().summary(locale)),
            }
        }
    }
}
