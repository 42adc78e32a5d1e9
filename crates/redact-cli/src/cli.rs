use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "redact")]
#[command(about = "Review and redact PHI findings in text files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "REDACT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// A document and the classifier result for it
#[derive(Args)]
pub struct Inputs {
    /// Text file to review
    pub file: PathBuf,

    /// Classifier result as JSON ({"containsPHI", "confidenceLevel", "suggestions"})
    #[arg(long, short)]
    pub detections: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every located occurrence as JSON
    Scan {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Accept every finding with its suggested replacement
    Apply {
        #[command(flatten)]
        inputs: Inputs,

        /// Write the redacted text here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the audit trail as JSON on stderr
        #[arg(long)]
        audit: bool,
    },

    /// Review findings interactively
    Review {
        #[command(flatten)]
        inputs: Inputs,

        /// Where `w` writes the text (default: <FILE>.redacted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the config path and effective config
    Config,
}
