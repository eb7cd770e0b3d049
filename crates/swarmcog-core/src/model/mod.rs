pub mod agent;
pub mod atom;
pub mod ids;
pub mod values;

pub use agent::{AgentId, AgentState, CognitivePhase};
pub use atom::{Atom, AtomData, AtomType};
pub use ids::{AtomId, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use values::{AttentionValue, TruthValue};
