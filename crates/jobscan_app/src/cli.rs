use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use jobscan_core::FilterSelection;
use jobscan_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "jobscan")]
#[command(bin_name = "jobscan")]
#[command(version)]
#[command(about = "Scan a mailbox for job application updates")]
pub struct Cli {
    /// Mailbox whose recent messages are scanned.
    pub email: String,

    /// Which results to show: all, positive, applied or rejected.
    #[arg(long, default_value = "all", value_parser = parse_filter)]
    pub filter: FilterSelection,

    /// RON config file. Defaults to ./jobscan.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

fn parse_filter(value: &str) -> Result<FilterSelection, String> {
    FilterSelection::parse(value).ok_or_else(|| {
        let names: Vec<&str> = FilterSelection::ALL.iter().map(|f| f.name()).collect();
        format!("unknown filter `{value}`, expected one of {}", names.join(", "))
    })
}
