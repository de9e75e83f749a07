//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check_content;
mod extract_keyword;
mod init;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use diarybatch::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "diarybatch")]
#[command(about = "Content moderation and monthly keyword batch jobs")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL (overrides config file and DATABASE_URL)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and apply database migrations
    Init,

    /// Moderate unchecked images and videos
    CheckContent {
        /// Content base directory holding image/, video/ and thumbnail/
        #[arg(long)]
        file_path: PathBuf,
        /// Items per committed chunk
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Skippable failures tolerated before the job fails
        #[arg(long)]
        skip_limit: Option<usize>,
    },

    /// Extract record keywords for a month and count them into diaries
    ExtractKeyword {
        /// Any date in the month to process, YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_date)]
        execution_date: Option<NaiveDate>,
        /// Items per committed chunk
        #[arg(long)]
        chunk_size: Option<usize>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got {:?}: {}", s, e))
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        database_url: cli.database,
    };
    let (mut settings, _config) = load_settings_with_options(options)
        .await
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::CheckContent {
            file_path,
            chunk_size,
            skip_limit,
        } => {
            if let Some(n) = chunk_size {
                settings.chunk_size = n;
            }
            if let Some(n) = skip_limit {
                settings.skip_limit = n;
            }
            check_content::cmd_check_content(&settings, &file_path).await
        }
        Commands::ExtractKeyword {
            execution_date,
            chunk_size,
        } => {
            if let Some(n) = chunk_size {
                settings.chunk_size = n;
            }
            let date = execution_date.unwrap_or_else(|| chrono::Local::now().date_naive());
            extract_keyword::cmd_extract_keyword(&settings, date).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(parse_date("2024/03/15").is_err());
    }

    #[test]
    fn test_cli_parses_check_content() {
        let cli = Cli::try_parse_from([
            "diarybatch",
            "-v",
            "check-content",
            "--file-path",
            "/srv/content",
            "--skip-limit",
            "5",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::CheckContent {
                file_path,
                skip_limit,
                chunk_size,
            } => {
                assert_eq!(file_path, PathBuf::from("/srv/content"));
                assert_eq!(skip_limit, Some(5));
                assert_eq!(chunk_size, None);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_cli_requires_file_path() {
        assert!(Cli::try_parse_from(["diarybatch", "check-content"]).is_err());
    }
}
