//! bocfx CLI - USD/CNY reference rate analytics
//!
//! ## Example Usage
//!
//! ```bash
//! # Daily averages for June's year, selling column
//! bocfx --month 2024-06 --column selling daily
//!
//! # Intraday publishes of one day
//! bocfx intraday --date 2024-06-03
//!
//! # Impact of the latest publish on a CNY exposure
//! bocfx impact --mode prev-day-avg --cny 1500000000
//!
//! # Lock the month's baseline
//! bocfx baseline lock 714.6
//!
//! # Export the month as a workbook
//! bocfx export xls --out june.xls
//! ```

use anyhow::{bail, Context as _};
use bocfx::alerts::{ImpactAlert, PublishMoveAlert};
use bocfx::baseline::{BaselineStore, SqliteBaselineStore};
use bocfx::capture::CaptureStatus;
use bocfx::constants::{
    DEFAULT_BASELINE_RATE, DEFAULT_EXPOSURE, DEFAULT_IMPACT_ALERT_MILLIONS, DEFAULT_PUBLISH_ALERT_PCT,
};
use bocfx::context::FxContext;
use bocfx::export::{self, fmt_fixed};
use bocfx::exposure::{Exposure, ImpactFigures, ImpactMode};
use bocfx::source::FsQuoteSource;
use bocfx::types::{RateColumn, RatePer100, YearMonth};
use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

/// bocfx: Bank of China USD/CNY reference rate analytics
#[derive(Parser)]
#[command(name = "bocfx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "USD/CNY reference rate aggregation, exposure impact and export", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Month to work on (YYYY-MM, default: current month in Beijing time)
    #[arg(short, long, global = true)]
    month: Option<YearMonth>,

    /// Rate column for daily and intraday figures
    #[arg(long, global = true, default_value = "middle")]
    column: RateColumn,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily averages of the selected column for the whole year
    Daily,

    /// Publishes of a single day with running average
    Intraday {
        /// Day to analyze (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
    },

    /// USD impact of the latest publish
    Impact {
        /// Comparison mode (prev-publish, prev-day-avg, baseline-lock)
        #[arg(long, default_value = "prev-day-avg")]
        mode: ImpactMode,

        /// Fixed CNY exposure
        #[arg(long, conflicts_with = "usd")]
        cny: Option<f64>,

        /// USD exposure converted at the reference rate
        #[arg(long)]
        usd: Option<f64>,

        /// Print the impact of every publish instead of the latest
        #[arg(long)]
        series: bool,
    },

    /// Manage the month's locked baseline
    Baseline {
        #[command(subcommand)]
        action: BaselineAction,
    },

    /// Export the month's snapshots
    Export {
        /// Output format
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output file (default: standard download name in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show the latest capture from a capture log
    Status {
        /// Capture log CSV
        #[arg(long)]
        log: PathBuf,
    },

    /// Evaluate publish-move and impact alerts
    Alert {
        /// USD exposure for the impact alert
        #[arg(long)]
        usd: Option<f64>,
    },
}

#[derive(Subcommand)]
enum BaselineAction {
    /// Lock a baseline rate (CNY per 100 USD)
    Lock {
        #[arg(value_name = "RATE")]
        rate: f64,
    },

    /// Show the baseline in force
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
    Xls,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_baseline_db")]
    baseline_db: PathBuf,
    #[serde(default = "default_baseline")]
    default_baseline: RatePer100,
    #[serde(default = "default_exposure")]
    default_exposure_cny: f64,
    #[serde(default = "default_exposure")]
    default_exposure_usd: f64,
    #[serde(default = "default_publish_alert_pct")]
    publish_alert_pct: f64,
    #[serde(default = "default_impact_alert_millions")]
    impact_alert_millions: f64,
    #[serde(default)]
    base_url: Option<String>,
}

fn config_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bocfx")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_baseline_db() -> PathBuf {
    config_home().join("baseline.db")
}

fn default_baseline() -> RatePer100 {
    DEFAULT_BASELINE_RATE
}

fn default_exposure() -> f64 {
    DEFAULT_EXPOSURE
}

fn default_publish_alert_pct() -> f64 {
    DEFAULT_PUBLISH_ALERT_PCT
}

fn default_impact_alert_millions() -> f64 {
    DEFAULT_IMPACT_ALERT_MILLIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            baseline_db: default_baseline_db(),
            default_baseline: default_baseline(),
            default_exposure_cny: default_exposure(),
            default_exposure_usd: default_exposure(),
            publish_alert_pct: default_publish_alert_pct(),
            impact_alert_millions: default_impact_alert_millions(),
            base_url: None,
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => config_home().join("config.toml"),
        };
        if !config_path.exists() {
            return Config::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(e) => {
                    eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                }
            },
            Err(e) => {
                eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
            }
        }
        Config::default()
    }

    fn open_store(&self) -> anyhow::Result<SqliteBaselineStore> {
        if let Some(parent) = self.baseline_db.parent() {
            fs::create_dir_all(parent)?;
        }
        SqliteBaselineStore::new(&self.baseline_db)
            .with_context(|| format!("opening {}", self.baseline_db.display()))
    }
}

/// Options shared by every command
struct Session {
    month: YearMonth,
    column: RateColumn,
    verbose: bool,
    config: Config,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());
    let month = cli
        .month
        .unwrap_or_else(|| YearMonth::of(Utc::now().with_timezone(&Shanghai).date_naive()));

    if cli.verbose {
        println!("{} v{}", "bocfx".cyan().bold(), env!("CARGO_PKG_VERSION"));
        println!("Month: {}  Column: {}", month, cli.column);
        println!("Data dir: {}", config.data_dir.display().to_string().dimmed());
    }

    let session = Session {
        month,
        column: cli.column,
        verbose: cli.verbose,
        config,
    };

    let result = match cli.command {
        Commands::Daily => show_daily(&session),
        Commands::Intraday { date } => show_intraday(&session, &date),
        Commands::Impact {
            mode,
            cny,
            usd,
            series,
        } => show_impact(&session, mode, cny, usd, series),
        Commands::Baseline { action } => handle_baseline(&session, action),
        Commands::Export { format, out } => export_month(&session, format, out),
        Commands::Status { log } => show_status(&log),
        Commands::Alert { usd } => run_alerts(&session, usd),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// Load the month and its year with a spinner
fn load_context(session: &Session) -> anyhow::Result<FxContext> {
    let store = session.config.open_store()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Loading {}...", session.month.year));

    let ctx = match &session.config.base_url {
        Some(url) => load_remote(session, &store, url)?,
        None => {
            let source = FsQuoteSource::new(&session.config.data_dir);
            FxContext::load(
                &source,
                &store,
                session.month,
                session.column,
                session.config.default_baseline,
            )?
        }
    };

    pb.finish_and_clear();
    if session.verbose {
        println!(
            "Loaded {} records ({} this month), {} days",
            ctx.year_records().len(),
            ctx.month_records().len(),
            ctx.daily().len()
        );
    }
    Ok(ctx)
}

#[cfg(feature = "async")]
fn load_remote(
    session: &Session,
    store: &SqliteBaselineStore,
    url: &str,
) -> anyhow::Result<FxContext> {
    let source = bocfx::source::HttpQuoteSource::new(url)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let months = runtime.block_on(source.load_months(session.month.year));
    Ok(FxContext::from_months(
        session.month,
        session.column,
        months,
        store.get(session.month)?,
        session.config.default_baseline,
    ))
}

#[cfg(not(feature = "async"))]
fn load_remote(
    _session: &Session,
    _store: &SqliteBaselineStore,
    url: &str,
) -> anyhow::Result<FxContext> {
    bail!("base_url {} requires the `async` feature", url)
}

fn fmt_pct(pct: Option<f64>) -> String {
    pct.map(|p| format!("{:+.2}%", p)).unwrap_or_default()
}

fn show_daily(session: &Session) -> anyhow::Result<()> {
    let ctx = load_context(session)?;

    println!(
        "{}",
        format!("Daily {} ({})", session.column, session.month.year)
            .cyan()
            .bold()
    );
    println!(
        "  {:<12} {:>10} {:>9} {:>10} {:>10} {:>5} {:>10} {:>9}",
        "date", "avg", "chg", "min", "max", "n", "first", "chg"
    );
    for (day, change) in ctx.daily().iter().zip(ctx.day_changes()) {
        println!(
            "  {:<12} {:>10} {:>9} {:>10} {:>10} {:>5} {:>10} {:>9}",
            day.date,
            fmt_fixed(day.avg, 2),
            fmt_pct(change.avg_pct),
            fmt_fixed(day.min, 2),
            fmt_fixed(day.max, 2),
            day.publishes,
            day.first.map(|v| fmt_fixed(v, 2)).unwrap_or_else(|| "-".to_string()),
            fmt_pct(change.first_pct)
        );
    }
    if ctx.daily().is_empty() {
        println!("{}", "  No published rates.".dimmed());
    }
    Ok(())
}

fn show_intraday(session: &Session, date: &str) -> anyhow::Result<()> {
    let ctx = load_context(session)?;
    let series = ctx.intraday(date);

    println!("{}", format!("Intraday {} {}", date, session.column).cyan().bold());
    if series.points.is_empty() {
        println!("{}", "  No publishes on this date.".dimmed());
        return Ok(());
    }
    for point in &series.points {
        println!(
            "  {:<20} {:>10} {:>10} {:>9}",
            point.publish_time,
            point.value.map(|v| fmt_fixed(v, 2)).unwrap_or_else(|| "-".to_string()),
            point
                .running_avg
                .map(|v| fmt_fixed(v, 4))
                .unwrap_or_else(|| "-".to_string()),
            fmt_pct(point.pct_change)
        );
    }
    if let Some(bounds) = series.bounds {
        println!(
            "  {} {} .. {}",
            "Chart range:".dimmed(),
            fmt_fixed(bounds.min, 4),
            fmt_fixed(bounds.max, 4)
        );
    }
    Ok(())
}

fn select_exposure(config: &Config, cny: Option<f64>, usd: Option<f64>) -> Exposure {
    match (cny, usd) {
        (_, Some(usd)) => Exposure::Usd(usd),
        (Some(cny), None) => Exposure::Cny(cny),
        (None, None) => Exposure::Cny(config.default_exposure_cny),
    }
}

fn print_figures(figures: &ImpactFigures) {
    let impact = format!("{:+.0} USD", figures.impact);
    // More USD needed for the same CNY is the adverse direction.
    let impact = if figures.impact > 0.0 {
        impact.red().bold()
    } else {
        impact.green().bold()
    };
    println!("  {} {:.4}", "Current rate:".bold(), figures.current_rate);
    println!("  {} {:.4}", "Reference rate:".bold(), figures.reference_rate);
    println!("  {} {:.0}", "Base CNY:".bold(), figures.base_cny);
    println!("  {} {:.0}", "USD now:".bold(), figures.usd_now);
    println!("  {} {:.0}", "USD reference:".bold(), figures.usd_reference);
    println!("  {} {}", "Impact:".bold(), impact);
    println!(
        "  {} {:.0} USD per +1.00",
        "Sensitivity:".bold(),
        figures.sensitivity
    );
}

fn show_impact(
    session: &Session,
    mode: ImpactMode,
    cny: Option<f64>,
    usd: Option<f64>,
    series: bool,
) -> anyhow::Result<()> {
    let ctx = load_context(session)?;
    let exposure = select_exposure(&session.config, cny, usd);

    if series {
        println!("{}", format!("Impact series ({})", mode).cyan().bold());
        for row in ctx.impact_series(mode, exposure) {
            let outcome = match &row.outcome {
                Ok(f) => format!("{:+.0}", f.impact),
                Err(e) => e.to_string().dimmed().to_string(),
            };
            println!(
                "  {:<20} {:>10} vs {:<20} {}",
                row.publish_time,
                row.rate.map(|v| fmt_fixed(v, 2)).unwrap_or_else(|| "-".to_string()),
                row.reference.unwrap_or_default(),
                outcome
            );
        }
        return Ok(());
    }

    println!("{}", format!("Impact ({})", mode).cyan().bold());
    match ctx.impact(mode, exposure) {
        Ok(summary) => {
            println!("  {} {} vs {}", "Compared:".bold(), summary.current, summary.reference);
            print_figures(&summary.figures);
        }
        Err(e) => println!("  {}", e.to_string().dimmed()),
    }
    Ok(())
}

fn handle_baseline(session: &Session, action: BaselineAction) -> anyhow::Result<()> {
    let mut store = session.config.open_store()?;
    match action {
        BaselineAction::Lock { rate } => {
            store.lock(session.month, rate)?;
            println!(
                "{} Baseline for {} locked at {}",
                "✓".green().bold(),
                session.month,
                rate.to_string().bright_green()
            );
        }
        BaselineAction::Show => match store.get(session.month)? {
            Some(rate) => println!("  {} {} (locked)", "Baseline:".bold(), rate),
            None => println!(
                "  {} {} {}",
                "Baseline:".bold(),
                session.config.default_baseline,
                "(default)".dimmed()
            ),
        },
    }
    Ok(())
}

fn export_month(
    session: &Session,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let ctx = load_context(session)?;
    if ctx.month_records().is_empty() {
        bail!("no records for {}", session.month);
    }

    let (text, default_name) = match format {
        ExportFormat::Csv => (ctx.csv()?, export::csv_file_name(session.month)),
        ExportFormat::Json => (ctx.json()?, export::json_file_name(session.month)),
        ExportFormat::Xls => (
            ctx.spreadsheet().to_xml(),
            export::spreadsheet_file_name(session.month, session.column),
        ),
    };

    let path = out.unwrap_or_else(|| PathBuf::from(default_name));
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    println!("{} Exported to: {}", "✓".green().bold(), path.display());
    Ok(())
}

fn show_status(log: &Path) -> anyhow::Result<()> {
    println!("{}", "Capture status".cyan().bold());
    let status = match CaptureStatus::from_path(log) {
        Ok(status) => status,
        Err(e) => {
            println!("  {}", e.to_string().dimmed());
            return Ok(());
        }
    };

    let local = status
        .captured_at_local()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S %Z").to_string())
        .unwrap_or_else(|| status.last_capture.clone());
    println!("  {} {}", "Last capture:".bold(), local);
    println!("  {} {}", "Publish time:".bold(), status.last_publish_time);
    println!(
        "  {} {}",
        "Middle:".bold(),
        status
            .last_middle
            .map(|v| fmt_fixed(v, 2))
            .unwrap_or_else(|| "-".to_string())
    );
    if status.publish_time_changed {
        println!("  {}", "New publish since previous capture".bright_green());
    }
    Ok(())
}

fn run_alerts(session: &Session, usd: Option<f64>) -> anyhow::Result<()> {
    let ctx = load_context(session)?;

    let publish = PublishMoveAlert::new(session.config.publish_alert_pct);
    match publish.evaluate(ctx.year_records()) {
        Ok(check) if check.triggered => {
            println!("{}", check.title().red().bold());
            println!("{}", check.message());
        }
        Ok(check) => println!(
            "{} publish move {:.4}% below {}%",
            "OK".green(),
            check.change_pct,
            check.threshold_pct
        ),
        Err(e) => println!("{}", e.to_string().dimmed()),
    }

    let impact = ImpactAlert::new(
        usd.unwrap_or(session.config.default_exposure_usd),
        ctx.baseline(),
        session.config.impact_alert_millions,
    );
    match impact.evaluate(ctx.year_records()) {
        Ok(check) if check.triggered => {
            println!("{}", check.title().red().bold());
            println!("{}", check.message());
        }
        Ok(check) => println!(
            "{} impact {:+.2}M below {}M",
            "OK".green(),
            check.impact_millions,
            check.threshold_millions
        ),
        Err(e) => println!("{}", e.to_string().dimmed()),
    }
    Ok(())
}
