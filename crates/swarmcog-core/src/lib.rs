//! Core data model and knowledge store for SwarmCog.
//!
//! The [`space::KnowledgeStore`] owns every atom, keeps its type and name
//! indices consistent with the atom map, and maintains the bounded
//! attentional focus. Atoms are plain values at the API boundary; links
//! refer to other atoms by [`model::AtomId`] only.

pub mod config;
pub mod error;
pub mod model;
pub mod space;

pub use config::{ProcessingMode, SwarmCogConfig};
pub use error::CoreError;
pub use model::{
    AgentId, AgentState, Atom, AtomData, AtomId, AtomType, AttentionValue, CognitivePhase,
    IdGenerator, SequentialIdGenerator, TruthValue, UuidIdGenerator,
};
pub use space::KnowledgeStore;
