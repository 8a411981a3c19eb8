//! Command-line definitions and handlers

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use uuid::Uuid;

use hercycle::config::Config;
use hercycle::intake;
use hercycle::models::{
    CycleProfile, CycleSummary, CycleTrackerEntry, MAX_CYCLE_LENGTH_DAYS, MAX_PERIOD_LENGTH_DAYS,
};
use hercycle::session::{ProfileUpdate, Session};
use hercycle::storage::Store;
use hercycle::summary;

/// HerCycle - private cycle tracking
///
/// Logs periods into an encrypted local file and predicts the next one.
#[derive(Parser, Debug)]
#[command(name = "hercycle", version)]
#[command(after_help = "\
Examples:
  hercycle init                                  Create the encrypted store
  hercycle log 2024-03-01 --end 2024-03-05       Log a period
  hercycle summary                               Current phase and next period
  hercycle summary --format json                 Same, as JSON
  hercycle summarize --entries history.json      Summarize exported backend data")]
pub struct Cli {
    /// Encrypted store path (overrides config and HERCYCLE_DATA_FILE)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Store passphrase
    #[arg(long, global = true, env = "HERCYCLE_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new encrypted store
    Init,

    /// Log a period by its first day (YYYY-MM-DD)
    Log {
        start: NaiveDate,

        /// Last day of bleeding
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Delete a logged period by id
    Delete { id: Uuid },

    /// List logged periods, oldest first
    List {
        #[arg(long, short = 'f', value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Show the cycle profile, or edit it when any option is given
    Profile {
        /// Typical cycle length in days
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CYCLE_LENGTH_DAYS))
        )]
        cycle_length: Option<u32>,

        /// Typical period length in days
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PERIOD_LENGTH_DAYS))
        )]
        period_length: Option<u32>,

        /// First day of the most recent period
        #[arg(long)]
        last_period_start: Option<NaiveDate>,
    },

    /// Current phase, cycle day and next-period prediction
    Summary {
        /// Reference day (default: today, local time)
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(long, short = 'f', value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Summarize profile and tracker JSON files without touching the store
    Summarize {
        /// Profile JSON object (snake_case or camelCase fields)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Tracker history JSON array
        #[arg(long)]
        entries: Option<PathBuf>,

        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(long, short = 'f', value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the decrypted store as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Permanently delete the store
    Wipe {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(path) = cli.data_file {
        config.data_file = Some(path);
    }
    let store = Store::new(match config.data_file.clone() {
        Some(path) => path,
        None => Store::default_path()?,
    });
    debug!(path = %store.path().display(), "using store");

    let passphrase = cli.passphrase;
    let require_passphrase = || -> Result<String> {
        match passphrase.clone() {
            Some(p) if !p.is_empty() => Ok(p),
            _ => bail!("a passphrase is required (--passphrase or HERCYCLE_PASSPHRASE)"),
        }
    };
    let open_session = || -> Result<Session> {
        let mut session = Session::new(store.clone());
        session.unlock(&require_passphrase()?)?;
        Ok(session)
    };

    match cli.command {
        Commands::Init => {
            let mut session = Session::new(store.clone());
            session.setup(&require_passphrase()?)?;
            println!("Created {}", store.path().display());
        }
        Commands::Log { start, end, notes } => {
            let id = open_session()?.log_period(start, end, notes)?;
            println!("{id}");
        }
        Commands::Delete { id } => {
            open_session()?.delete_entry(id)?;
            println!("Deleted {id}");
        }
        Commands::List { format } => {
            let entries = open_session()?.entries()?;
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
                Format::Text => print!("{}", render_entries(&entries)),
            }
        }
        Commands::Profile {
            cycle_length,
            period_length,
            last_period_start,
        } => {
            let mut session = open_session()?;
            let profile = if cycle_length.is_some()
                || period_length.is_some()
                || last_period_start.is_some()
            {
                session.update_profile(ProfileUpdate {
                    cycle_length_days: cycle_length,
                    period_length_days: period_length,
                    last_period_start,
                })?
            } else {
                session.profile()?
            };
            print!("{}", render_profile(&profile));
        }
        Commands::Summary { today, format } => {
            let today = today.unwrap_or_else(local_today);
            let summary = open_session()?.summary(today, &config.prediction)?;
            emit_summary(&summary, today, format)?;
        }
        Commands::Summarize {
            profile,
            entries,
            today,
            format,
        } => {
            let profile = match profile {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    intake::parse_profile(&json)
                        .with_context(|| format!("{} is not a JSON object", path.display()))?
                }
                None => CycleProfile::default(),
            };
            let entries = match entries {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    intake::parse_tracker_entries(&json)
                        .with_context(|| format!("{} is not a JSON array", path.display()))?
                }
                None => Vec::new(),
            };
            let today = today.unwrap_or_else(local_today);
            let summary = summary::compose(
                &profile,
                entries.iter().map(intake::RawTrackerEntry::start_day),
                today,
                &config.prediction,
            );
            emit_summary(&summary, today, format)?;
        }
        Commands::Export { output } => {
            let json = open_session()?.export()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Wipe { yes } => {
            if !yes {
                bail!("refusing to wipe without --yes");
            }
            let mut session = Session::new(store.clone());
            session.wipe()?;
            println!("Wiped {}", store.path().display());
        }
    }

    Ok(())
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn emit_summary(summary: &CycleSummary, today: NaiveDate, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        Format::Text => print!("{}", render_summary(summary, today)),
    }
    Ok(())
}

fn render_summary(summary: &CycleSummary, today: NaiveDate) -> String {
    let mut out = String::new();
    if !summary.has_data {
        out.push_str("No cycle data yet. Log a period or set a last period start.\n");
        return out;
    }

    let _ = writeln!(out, "As of {today}");
    if let (Some(phase), Some(day)) = (summary.current_phase, summary.current_cycle_day) {
        let _ = writeln!(out, "  Cycle day {day}, {phase} phase");
    }
    if let (Some(days), Some(date)) = (summary.days_until_next_period, summary.next_period_date) {
        let when = match days {
            d if d > 1 => format!("in {d} days"),
            1 => "tomorrow".to_string(),
            0 => "today".to_string(),
            -1 => "1 day late".to_string(),
            d => format!("{} days late", -d),
        };
        let _ = writeln!(out, "  Next period {when} ({date})");
    }
    if summary.used_average {
        if let Some(avg) = summary.avg_cycle_length {
            let _ = write!(out, "  Average cycle {avg} days");
        }
        if let Some(count) = summary.cycle_count {
            let _ = write!(out, " over {count} cycles");
        }
        if let Some(confidence) = summary.confidence {
            let _ = write!(out, ", {confidence} confidence");
        }
        out.push('\n');
        if summary.is_irregular {
            let spread = summary.variability_days.unwrap_or_default();
            let _ = writeln!(out, "  Cycles vary by {spread} days; predictions are less reliable");
        }
    } else {
        out.push_str("  Based on your profile; log more periods for a personal average\n");
    }
    out
}

fn render_entries(entries: &[CycleTrackerEntry]) -> String {
    if entries.is_empty() {
        return "No periods logged.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let end = entry
            .period_end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = write!(out, "{}  {} .. {}", entry.id, entry.period_start_date, end);
        if !entry.notes.is_empty() {
            let _ = write!(out, "  {}", entry.notes);
        }
        out.push('\n');
    }
    out
}

fn render_profile(profile: &CycleProfile) -> String {
    let last = profile
        .last_period_start
        .map(|d| d.to_string())
        .unwrap_or_else(|| "not set".to_string());
    format!(
        "Cycle length:      {} days\nPeriod length:     {} days\nLast period start: {}\n",
        profile.cycle_length_days, profile.period_length_days, last
    )
}
