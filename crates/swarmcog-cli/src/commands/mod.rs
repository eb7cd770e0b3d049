pub mod run;
pub mod space;
pub mod version;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Register agents and run cognitive cycles on the worker pool
    Run(run::RunArgs),
    /// Seed a demo knowledge store and show what it holds
    Space(space::SpaceArgs),
    /// Print version information
    Version,
}
