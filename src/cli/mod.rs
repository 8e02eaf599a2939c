mod args;
mod config;
mod global;
mod handlers;

use args::Commands;
use clap::Parser;
use global::GlobalArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bitglyph")]
#[command(version)]
#[command(about = "Encode binary payloads into restricted alphabets with checksums and entropy mixing", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    let registry = config::load_registry(&cli.global)?;

    match cli.command {
        Commands::Encode(args) => handlers::encode::handle(args, &cli.global, &registry),
        Commands::Decode(args) => handlers::decode::handle(args, &cli.global, &registry),
        Commands::Inspect(args) => handlers::inspect::handle(args, &cli.global, &registry),
        Commands::Config { action } => handlers::config::handle(action, &registry),
        Commands::Bench(args) => handlers::bench::handle(args, &cli.global, &registry),
    }
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing(global: &GlobalArgs) {
    let filter = match global.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
