//! CLI for the tutor quiz generator.

mod commands;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tutor_core::config;

use commands::{run_fallback, run_quiz, run_topics};

/// Top-level CLI for the tutor quiz generator.
#[derive(Debug, Parser)]
#[command(name = "tutor")]
#[command(about = "Tutor: algebra practice quizzes with offline fallback", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate a practice quiz, falling back to curated questions if the service fails.
    Quiz {
        /// Topic identifier, e.g. linear_equations.
        topic: String,

        /// Number of questions.
        #[arg(long, short = 'n', default_value = "5", value_name = "N")]
        count: usize,

        /// Student context passed to the prompt (repeatable), e.g. --context grade_average=72.
        #[arg(long = "context", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        context: Vec<(String, String)>,

        /// Print items as JSON instead of formatted text.
        #[arg(long)]
        json: bool,
    },

    /// List topics that have curated fallback questions.
    Topics,

    /// Print curated questions for a topic without contacting the service.
    Fallback {
        /// Topic identifier.
        topic: String,

        /// Number of questions.
        #[arg(long, short = 'n', default_value = "5", value_name = "N")]
        count: usize,

        /// Print items as JSON instead of formatted text.
        #[arg(long)]
        json: bool,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {:?}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("empty context key in {:?}", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Quiz {
                topic,
                count,
                context,
                json,
            } => run_quiz(&cfg, &topic, count, &context, json).await?,
            CliCommand::Topics => run_topics(&cfg)?,
            CliCommand::Fallback { topic, count, json } => run_fallback(&cfg, &topic, count, json)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
