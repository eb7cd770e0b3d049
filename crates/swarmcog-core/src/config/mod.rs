pub mod settings;

pub use settings::{default_workers, ProcessingMode, SwarmCogConfig};
