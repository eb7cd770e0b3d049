mod observers;
mod table;

pub use observers::Observer;
pub use table::AgentTable;

pub(crate) use observers::panic_message;
pub(crate) use table::observer;
