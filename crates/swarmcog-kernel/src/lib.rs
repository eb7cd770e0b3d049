//! Cognitive microkernel for SwarmCog.
//!
//! A [`Scheduler`] owns the agent state table, a priority queue of phase
//! tasks and a fixed pool of worker threads. Each call to
//! [`Scheduler::run_cognitive_cycle`] enqueues the seven phases of one
//! cycle; the queue releases a cycle's phases one at a time so they run in
//! order on any number of workers.

pub mod agents;
pub mod error;
pub mod phases;
pub mod scheduler;

pub use agents::{AgentTable, Observer};
pub use error::KernelError;
pub use phases::{CognitiveContext, PhaseHandler, PhaseRegistry};
pub use scheduler::{CognitiveTask, CycleId, ProcessingStats, Scheduler, TaskId};
