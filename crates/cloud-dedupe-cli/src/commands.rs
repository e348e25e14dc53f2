use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cloud_dedupe_core::{Error, Rule};

#[derive(Debug, Parser)]
#[command(name = "cloud-dedupe")]
#[command(about = "Find and delete duplicate video files on a cloud drive mount", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan configured roots, group duplicates by content hash, apply a keep rule
    Scan {
        /// Rule that selects the file to keep in each duplicate set
        #[arg(long, value_enum, default_value = "shortest")]
        rule: RuleArg,
        /// Path suffix to keep; required with --rule suffix
        #[arg(long)]
        suffix: Option<String>,
        /// Write a text report of all duplicate sets to this file
        #[arg(long)]
        report: Option<PathBuf>,
        /// Delete the files the rule marked (asks for confirmation)
        #[arg(long)]
        delete: bool,
    },
    /// Verify the drive is reachable by listing the remote root
    TestConnection,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RuleArg {
    /// Keep the file with the shortest path
    Shortest,
    /// Keep the file with the longest path
    Longest,
    /// Keep the oldest file (modified date)
    Oldest,
    /// Keep the newest file (modified date)
    Newest,
    /// Keep the file whose path ends with --suffix
    Suffix,
}

impl RuleArg {
    pub fn into_rule(self, suffix: Option<String>) -> Result<Rule, Error> {
        match self {
            RuleArg::Shortest => Ok(Rule::ShortestPath),
            RuleArg::Longest => Ok(Rule::LongestPath),
            RuleArg::Oldest => Ok(Rule::Oldest),
            RuleArg::Newest => Ok(Rule::Newest),
            RuleArg::Suffix => match suffix {
                Some(suffix) if !suffix.trim().is_empty() => Ok(Rule::SuffixMatch(suffix)),
                _ => Err(Error::MissingSuffix),
            },
        }
    }
}
