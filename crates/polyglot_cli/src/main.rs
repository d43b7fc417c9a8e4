use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use polyglot_core::{
    DateStyle, EscapeMode, LocaleConfig, Localizer, MemoryStore, RequestSignals, Variables,
};

/// Inspect locale resolution and translation resources from the command line.
#[derive(Parser, Debug)]
#[command(author, version, about = "Polyglot localization command-line interface", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Resource root directory (overrides the configuration)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Locale to activate instead of detecting one
    #[arg(long, short = 'l', global = true)]
    locale: Option<String>,

    /// Activate `--locale` even when it is not supported
    #[arg(long, global = true)]
    force: bool,

    /// Accept-Language header used for detection
    #[arg(long, global = true)]
    accept_language: Option<String>,

    /// Locale persisted in the session store
    #[arg(long, global = true)]
    session: Option<String>,

    /// Raise structural failures instead of logging them
    #[arg(long, global = true)]
    strict: bool,

    /// Log filter, e.g. `debug` or `polyglot_core=trace`
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format: pretty, compact or json
    #[arg(long, global = true, default_value = "compact")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the active locale
    Resolve,
    /// Translate a key in the active locale
    Translate {
        key: String,
        /// Skip entity decoding and tag stripping
        #[arg(long)]
        raw: bool,
    },
    /// Render the plural form of a key
    Plural {
        key: String,
        count: i64,
        /// Extra variables as `name=value`
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
    /// Dump the localizer state as JSON
    Info,
    /// Format a number in the active locale
    FormatNumber {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        #[arg(long, default_value_t = 2)]
        max_fraction_digits: usize,
    },
    /// Format a currency amount in the active locale
    FormatCurrency {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        currency: String,
        /// Show the ISO code instead of the symbol
        #[arg(long)]
        no_symbol: bool,
    },
    /// Format a date (YYYY-MM-DD, default today) in the active locale
    FormatDate {
        date: Option<String>,
        /// short, medium, long or full
        #[arg(long, default_value = "long")]
        style: String,
    },
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = match &cli.config {
        Some(path) => LocaleConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => LocaleConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.resource_root = Some(root.clone());
    } else if config.resource_root.is_none() {
        config.resource_root = Some(std::env::current_dir().context("Failed to read working directory")?);
    }
    if cli.strict {
        config.debug = true;
    }

    let mut request = RequestSignals::new();
    if let Some(header) = &cli.accept_language {
        request = request.with_accept_language(header.clone());
    }
    let session = seeded_session(&config, cli.session.as_deref());
    let mut builder = Localizer::builder(config).request(request).detect_on_build(false);
    if let Some(store) = session {
        builder = builder.session_store(store);
    }
    let mut localizer = builder.build()?;
    let active = localizer.set_active(cli.locale.as_deref(), cli.force)?;
    tracing::debug!(locale = %active, "localizer ready");

    match cli.command {
        Command::Resolve => println!("{active}"),
        Command::Translate { key, raw } => {
            let mode = if raw { EscapeMode::Raw } else { EscapeMode::Sanitize };
            println!("{}", localizer.translate(&key, mode));
        }
        Command::Plural { key, count, vars } => {
            let vars: Variables = vars.into_iter().collect();
            println!("{}", localizer.translate_plural(&key, count, &vars)?);
        }
        Command::Info => {
            println!("{}", serde_json::to_string_pretty(&localizer.info())?);
        }
        Command::FormatNumber { value, max_fraction_digits } => {
            println!("{}", localizer.format_number(value, max_fraction_digits)?);
        }
        Command::FormatCurrency { amount, currency, no_symbol } => {
            println!("{}", localizer.format_currency(amount, &currency, !no_symbol)?);
        }
        Command::FormatDate { date, style } => {
            let date = match date {
                Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date '{text}', expected YYYY-MM-DD"))?,
                None => chrono::Local::now().date_naive(),
            };
            println!("{}", localizer.format_date(date, DateStyle::parse_lenient(&style))?);
        }
    }

    Ok(())
}

/// Session store holding `--session` under the configured key
fn seeded_session(config: &LocaleConfig, locale: Option<&str>) -> Option<MemoryStore> {
    let locale = locale?;
    if !config.session_enabled {
        tracing::warn!(locale, "--session ignored: sessions are disabled in the configuration");
        return None;
    }
    Some(MemoryStore::with_entry(config.session_key.clone(), locale))
}

#[cfg(feature = "logging")]
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    use polyglot_core::logging::{self, LoggingConfig};

    let config = LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.parse()?,
        ..LoggingConfig::default()
    };
    logging::init(&config)?;
    Ok(())
}

#[cfg(not(feature = "logging"))]
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    if cli.log_format != "compact" {
        anyhow::bail!("this build has no log output; rebuild with the `logging` feature");
    }
    Ok(())
}
