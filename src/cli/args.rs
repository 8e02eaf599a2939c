use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode bytes into alphabet text
    Encode(EncodeArgs),

    /// Decode alphabet text back into bytes
    Decode(DecodeArgs),

    /// Print a document's header without decoding the body
    Inspect(InspectArgs),

    /// Show configured alphabets
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Compare sequential and parallel encoding paths
    Bench(BenchArgs),
}

/// Arguments for encoding data
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Alphabet to encode with (defaults to the configured one)
    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for decoding data
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Alphabet the document was encoded with
    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Print the decoded bytes as hex
    #[arg(long)]
    pub hex: bool,
}

/// Arguments for inspecting a document
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Alphabet the document was encoded with
    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// List available alphabets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show details for a specific alphabet
    Show {
        /// Alphabet name
        name: String,
    },
}

/// Arguments for the path comparison
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Payload size in bytes
    #[arg(long, default_value = "1048576")]
    pub size: usize,

    /// Alphabet to benchmark (defaults to the configured one)
    #[arg(short = 'a', long)]
    pub alphabet: Option<String>,

    /// Timed runs per path
    #[arg(long, default_value = "3")]
    pub iterations: u32,

    /// Seed for the random payload
    #[arg(long, default_value = "0")]
    pub seed: u64,
}
