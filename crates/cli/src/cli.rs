use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Render the parts of a document that matched a query into token-budgeted
/// sections for a language model prompt.
///
/// Results are printed to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "passage", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Tokenizer used to measure text: char, or cl100k when built with `tiktoken`.
    /// Defaults to the configured tokenizer.
    #[arg(long, global = true)]
    pub tokenizer: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// The most relevant sections, best first, widened with surrounding text
    Sections {
        #[command(flatten)]
        input: InputArgs,

        /// Token budget per section
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Maximum number of sections to return
        #[arg(long)]
        max_sections: Option<usize>,

        /// Do not add surrounding text or connectors
        #[arg(long)]
        no_overlap: bool,
    },

    /// Every matched section, in document order
    All {
        #[command(flatten)]
        input: InputArgs,

        /// Token budget per section
        #[arg(long)]
        max_tokens: Option<usize>,
    },

    /// All matched sections joined into one content string
    Content {
        #[command(flatten)]
        input: InputArgs,

        /// Token budget per section
        #[arg(long)]
        max_tokens: Option<usize>,
    },
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path to the document text (UTF-8)
    #[arg(long)]
    pub document: PathBuf,

    /// Path to a JSON array of hits: [{"start_pos", "end_pos", "score"}, ...]
    #[arg(long)]
    pub hits: PathBuf,
}
