//! orar: command line front end.
//!
//! - `orar timetable <URL>...` scrapes timetable pages and prints them as JSON
//! - `orar calendar` prints the academic year structure as JSON
//! - `orar feed <timetable.json>` prints the iCalendar feed of a timetable

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use orar::academic::{scrape_academic_calendar, AcademicCalendarCache, Language};
use orar::feed::{generate_feed, FeedOptions};
use orar::fetch::{BatchOptions, DocumentFetcher, FetchConfig};
use orar::schedule::UserTimetable;
use orar::timetable::fetch_timetables;
use orar::OrarConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orar")]
#[command(about = "UBB timetable scraper and calendar feed generator")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape timetable pages and print them as JSON
    Timetable {
        /// Timetable page URLs (.../orar/{YEAR}-{SEMESTER}/tabelar/{CODE}.html)
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Scrape the academic year structure and print it as JSON
    Calendar {
        /// Only print this language line (ro-en or hu-de)
        #[arg(long)]
        language: Option<Language>,
    },
    /// Print the iCalendar feed of a timetable JSON file
    Feed {
        timetable: PathBuf,

        #[arg(long, default_value = "ro-en")]
        language: Language,

        /// The timetable belongs to a graduating year
        #[arg(long)]
        terminal: bool,

        #[arg(long)]
        no_vacations: bool,

        #[arg(long)]
        no_exam_periods: bool,

        /// Last day of every recurring series (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => OrarConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => OrarConfig::default(),
    };
    let fetcher = DocumentFetcher::with_config(FetchConfig::from(&config)).context("building HTTP client")?;

    match args.command {
        Command::Timetable { urls } => {
            let report = fetch_timetables(&fetcher, &urls, BatchOptions::from(&config)).await;

            for (url, error) in report.benign_failures() {
                info!(url = %url, "{}", error);
            }
            for (url, error) in report.hard_failures() {
                warn!(url = %url, error = %error, "Timetable failed");
            }

            let timetables: Vec<_> = report.successes.iter().map(|(_, t)| t).collect();
            println!("{}", serde_json::to_string_pretty(&timetables)?);

            if report.successes.is_empty() && report.hard_failures().next().is_some() {
                bail!("no timetable could be scraped");
            }
        }
        Command::Calendar { language } => {
            let structures = scrape_academic_calendar(&fetcher, &config.calendar_url).await?;
            let selected: Vec<_> = structures
                .iter()
                .filter(|s| language.map_or(true, |l| s.language == l))
                .collect();
            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
        Command::Feed {
            timetable,
            language,
            terminal,
            no_vacations,
            no_exam_periods,
            until,
        } => {
            let content = std::fs::read_to_string(&timetable)
                .with_context(|| format!("reading {}", timetable.display()))?;
            let timetable: UserTimetable =
                serde_json::from_str(&content).map_err(orar::OrarError::from)?;

            let options = FeedOptions {
                language,
                is_terminal_year: terminal,
                include_vacations: !no_vacations,
                include_exam_periods: !no_exam_periods,
                until,
                ..FeedOptions::from(&config)
            };
            let cache = AcademicCalendarCache::new(config.calendar_ttl());
            let ics = generate_feed(&timetable, &options, &cache, &fetcher).await?;
            print!("{}", ics);
        }
    }

    Ok(())
}
