use bitglyph::BackendKind;
use clap::{ArgAction, Args};
use std::path::PathBuf;

/// Global arguments that apply to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Extra alphabets.toml layer, applied after the user and local files
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Payloads up to this many bytes use the small-payload path
    #[arg(long, global = true, value_name = "BYTES")]
    pub threshold: Option<usize>,

    /// Parallel backend for large chunked payloads (auto, threads, cpu, none)
    #[arg(long, global = true, value_name = "KIND")]
    pub backend: Option<BackendKind>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress informational notices
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Maximum input size in bytes (0 = unlimited)
    #[arg(long, global = true, default_value = "104857600")]
    pub max_size: usize,

    /// Process files exceeding --max-size limit
    #[arg(long, global = true)]
    pub force: bool,
}

impl GlobalArgs {
    /// Filter directive for the log subscriber, or `None` to defer to `RUST_LOG`.
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("bitglyph=info"),
            2 => Some("bitglyph=debug"),
            _ => Some("bitglyph=trace"),
        }
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_file
            .as_deref()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
    }
}
