// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `shopsched`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shopsched",
    version,
    about = "Capacity-aware work scheduling and SLA policies for a repair shop.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the shop file (TOML).
    ///
    /// Default: `Shopsched.toml` in the current working directory.
    #[arg(long, global = true, value_name = "PATH", default_value = "Shopsched.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHOPSCHED_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Name stamped on every record this invocation changes.
    #[arg(long, global = true, value_name = "NAME", default_value = "cli")]
    pub actor: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate the shop file and print a summary.
    Check,

    /// Forecast a work item's completion against its resource's calendar.
    Forecast {
        item: String,

        /// Also print the day-by-day allocation.
        #[arg(long)]
        detail: bool,
    },

    /// Move a work item to a new status, honouring its predecessors.
    Transition {
        item: String,

        /// Target status (open, working, paused, pending_review, completed,
        /// canceled).
        status: String,
    },

    /// Set a work item's progress and roll it up to its parents.
    Progress { item: String, value: f64 },

    /// Refresh capacity snapshots for every open work item.
    Reconcile {
        /// Run a single pass and exit instead of repeating on
        /// `[config].reconcile_interval_secs`.
        #[arg(long)]
        once: bool,
    },

    /// Show which SLA rule governs a job.
    Resolve(JobArgs),

    /// Classify a job's elapsed time against its SLA rule.
    Assess {
        #[command(flatten)]
        job: JobArgs,

        #[arg(long, value_name = "MINUTES")]
        elapsed_minutes: i64,
    },
}

/// Attributes selecting an SLA rule.
#[derive(Debug, Clone, Args)]
pub struct JobArgs {
    #[arg(long = "service", value_name = "TYPE")]
    pub service_type: String,

    #[arg(long)]
    pub workshop: Option<String>,

    #[arg(long = "start", value_name = "EVENT")]
    pub start_event: String,

    #[arg(long = "stop", value_name = "EVENT")]
    pub stop_event: String,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transition_with_global_flags() {
        let args = CliArgs::try_parse_from([
            "shopsched",
            "transition",
            "A",
            "completed",
            "--actor",
            "dana",
            "--config",
            "shop.toml",
        ])
        .unwrap();

        assert_eq!(args.actor, "dana");
        assert_eq!(args.config, "shop.toml");
        match args.command {
            Command::Transition { item, status } => {
                assert_eq!(item, "A");
                assert_eq!(status, "completed");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn assess_flattens_job_args() {
        let args = CliArgs::try_parse_from([
            "shopsched",
            "assess",
            "--service",
            "Overhaul",
            "--start",
            "Intake",
            "--stop",
            "QC",
            "--elapsed-minutes",
            "90",
        ])
        .unwrap();

        match args.command {
            Command::Assess { job, elapsed_minutes } => {
                assert_eq!(job.service_type, "Overhaul");
                assert_eq!(job.workshop, None);
                assert_eq!(elapsed_minutes, 90);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_apply() {
        let args = CliArgs::try_parse_from(["shopsched", "reconcile", "--once"]).unwrap();
        assert_eq!(args.config, "Shopsched.toml");
        assert_eq!(args.actor, "cli");
        assert!(matches!(args.command, Command::Reconcile { once: true }));
    }
}
