//! Thread-safe knowledge store.
//!
//! Locking layout:
//! - the atom map and both indices sit behind one `RwLock`; structural
//!   add/remove take it exclusively, lookups share it;
//! - each atom's truth/attention/metadata sits behind its own `Mutex`, so the
//!   decay sweep never holds the map lock while touching payloads;
//! - the attentional focus has a separate `Mutex`.
//!
//! When two are needed the map lock is taken first.

mod attention;
mod entry;
mod factories;
pub mod focus;
mod index;
mod relations;
mod store;

pub use focus::{AttentionalFocus, FOCUS_CAPACITY};
pub use store::KnowledgeStore;
