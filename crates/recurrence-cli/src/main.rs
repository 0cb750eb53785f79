//! `recur` CLI — preview and check recurrence rules from the command line.
//!
//! Rules are JSON or TOML documents (format chosen by file extension; stdin is
//! read as JSON).
//!
//! ## Usage
//!
//! ```sh
//! # Next occurrence after a date
//! echo '{"frequency":"monthly","dayOfMonth":31}' | recur next --after 2025-01-31T00:00:00Z
//!
//! # Preview the next ten occurrences, shown in the rule's own zone
//! recur list -r habit.toml --after 2025-01-01T00:00:00Z --limit 10 --local
//!
//! # Is a date on the schedule that started at the anchor?
//! recur matches -r habit.json --date 2025-01-06T12:00:00Z --anchor 2025-01-01T08:00:00Z
//!
//! # Export as an RFC 5545 RRULE
//! recur rrule -r habit.json
//!
//! # Check a rule document
//! recur validate -r habit.json
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use recurrence_engine::{RecurrenceEngine, RecurrenceRule};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recur", version, about = "Recurrence rule preview and checking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rule file, JSON or TOML by extension (reads JSON from stdin if omitted or `-`)
    #[arg(short, long, global = true)]
    rule: Option<String>,

    /// Log filter directive written to stderr (e.g. "debug", "recurrence_engine=trace")
    #[arg(long, global = true, env = "RECUR_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the next occurrence strictly after a date, or "none"
    Next {
        /// Reference date (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        after: DateTime<Utc>,
        /// Print in the rule's time zone instead of UTC
        #[arg(long)]
        local: bool,
    },
    /// Print successive occurrences, one per line
    List {
        /// Reference date (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        after: DateTime<Utc>,
        /// Maximum number of occurrences
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Stop before this date (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        until: Option<DateTime<Utc>>,
        /// Print in the rule's time zone instead of UTC
        #[arg(long)]
        local: bool,
    },
    /// Print whether a date falls on the schedule started at an anchor date
    Matches {
        /// Date to check (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        date: DateTime<Utc>,
        /// The schedule's start date (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        anchor: DateTime<Utc>,
    },
    /// Print the rule as an RFC 5545 RRULE value
    Rrule,
    /// Check that a rule document is valid
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let rule = load_rule(cli.rule.as_deref())?;
    tracing::debug!(?rule, "loaded rule");
    let engine = RecurrenceEngine::new();

    match cli.command {
        Commands::Next { after, local } => match engine.next_occurrence(&rule, after) {
            Some(next) => println!("{}", format_instant(&rule, next, local)),
            None => println!("none"),
        },
        Commands::List {
            after,
            limit,
            until,
            local,
        } => {
            let mut listed = engine.occurrences(&rule, after, limit);
            if let Some(end) = until {
                listed = listed.until(end);
            }
            for at in listed {
                println!("{}", format_instant(&rule, at, local));
            }
        }
        Commands::Matches { date, anchor } => {
            println!("{}", engine.matches(&rule, date, anchor));
        }
        Commands::Rrule => println!("{}", rule.to_rrule()),
        Commands::Validate => println!("ok"),
    }

    Ok(())
}

fn init_tracing(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter: {}", directive))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging")
}

fn parse_instant(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 date-time: {}", e))
}

fn format_instant(rule: &RecurrenceRule, at: DateTime<Utc>, local: bool) -> String {
    if local {
        at.with_timezone(&rule.time_zone())
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    } else {
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn load_rule(path: Option<&str>) -> Result<RecurrenceRule> {
    match path {
        Some(path) if path != "-" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path))?;
            if path.ends_with(".toml") {
                toml::from_str(&text).with_context(|| format!("Invalid rule in {}", path))
            } else {
                serde_json::from_str(&text).with_context(|| format!("Invalid rule in {}", path))
            }
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            serde_json::from_str(&buf).context("Invalid rule on stdin")
        }
    }
}
