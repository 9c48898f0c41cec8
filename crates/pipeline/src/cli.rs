use std::path::PathBuf;

use clap::Parser;

/// Ask questions about a PDF document.
///
/// Indexes the document once at startup, then answers either a single
/// `--question` or questions typed at the prompt until `quit`.
#[derive(Parser, Debug)]
#[command(name = "docqa", about = "Question answering over a PDF document")]
pub struct CliArgs {
    /// Document to index (overrides PDF_PATH)
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Ask one question and exit
    #[arg(long, short)]
    pub question: Option<String>,

    /// Print raw JSON responses instead of formatted text
    #[arg(long)]
    pub json: bool,

    /// Config profile, e.g. PROD (overrides DOCQA_PROFILE)
    #[arg(long, env = "DOCQA_PROFILE")]
    pub profile: Option<String>,

    /// Print pipeline status and exit
    #[arg(long)]
    pub status: bool,
}
