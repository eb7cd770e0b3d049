use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "swarmcog",
    version,
    about = "Run cognitive agent cycles over a shared knowledge store"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: commands::Commands,
}

/// Filter directive: `-v` wins, then `RUST_LOG`, then the config's `log_level`.
fn filter_directive(verbose: u8, env: Option<String>, config_level: Option<&str>) -> String {
    match verbose {
        0 => env
            .or_else(|| config_level.map(str::to_string))
            .unwrap_or_else(|| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_tracing(verbose: u8, config_level: Option<&str>) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(verbose, env, config_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_level = match &cli.command {
        commands::Commands::Run(args) => commands::run::configured_log_level(args),
        _ => None,
    };
    init_tracing(cli.verbose, config_level.as_deref());

    match &cli.command {
        commands::Commands::Run(args) => commands::run::run(args, cli.format),
        commands::Commands::Space(args) => commands::space::run(args, cli.format),
        commands::Commands::Version => commands::version::run(),
    }
}
