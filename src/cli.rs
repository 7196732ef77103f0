//! clap-based command-line interface for caflow.
//!
//! Defines the [`Cli`] struct with subcommands [`Command`] (graph,
//! recommend, generate, analyze, demo) and global flags (--config,
//! --verbose).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// caflow — template recommendation and email generation for career advisors.
#[derive(Debug, Parser)]
#[command(name = "caflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file (defaults to caflow.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable detailed output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Case fields shared by the subcommands that operate on a single case.
#[derive(Debug, Args)]
pub struct CaseArgs {
    /// Current workflow status of the case (e.g. 書類選考中).
    #[arg(long)]
    pub status: String,

    /// Candidate name.
    #[arg(long)]
    pub candidate: String,

    /// Company name.
    #[arg(long)]
    pub company: String,

    /// Job title for the position.
    #[arg(long, default_value = "")]
    pub job_title: String,

    /// Candidate enthusiasm score in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    pub enthusiasm: f64,

    /// Candidate concern score in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    pub concern: f64,

    /// Free-text summary of the latest situation.
    #[arg(long, default_value = "")]
    pub summary: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the workflow status graph grouped by phase.
    Graph,

    /// Rank applicable templates for a case.
    Recommend {
        #[command(flatten)]
        case: CaseArgs,
    },

    /// Generate an email for a case, optionally guided by a template.
    Generate {
        #[command(flatten)]
        case: CaseArgs,

        /// Use this template by name instead of the top recommendation.
        #[arg(long)]
        template: Option<String>,

        /// Skip the template catalog and generate from the case alone.
        #[arg(long, default_value_t = false)]
        no_template: bool,
    },

    /// Analyze a candidate message for enthusiasm and concern scores.
    Analyze {
        /// Message text to analyze.
        content: Option<String>,

        /// Read the message from a file instead.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Run the built-in demonstration over sample cases.
    Demo,
}
