use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "roster-sync")]
#[command(about = "Synchronize platform enrollments with the CRM roster")]
pub struct Cli {
    #[arg(long, default_value = "roster-sync.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Log what would happen without writing anything")]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enroll students the CRM has flagged for enrollment.
    Enroll,
    /// Unenroll students the CRM has flagged for removal.
    Unenroll,
    /// Switch students into their approved specializations.
    Specializations,
    /// Enroll cleared students into the careers module.
    Careers,
    /// Run every pass, in the order above.
    All,
}
