//! The seven phase handlers and the registry that dispatches to them.

mod context;
mod handlers;

use std::sync::Arc;

use swarmcog_core::{AgentState, CognitivePhase, KnowledgeStore};

pub use context::CognitiveContext;
pub use handlers::{
    AttentionPhase, ExecutionPhase, LearningPhase, PerceptionPhase, PlanningPhase,
    ReasoningPhase, ReflectionPhase, ATTENTION_SELECTION, EXECUTION_LIMIT,
};

use crate::agents::AgentTable;
use crate::error::KernelError;

/// Work done for one phase of an agent's cycle.
///
/// `state` is a copy of the agent's state; the dispatcher advances its
/// phase and commits it after `run` returns `Ok`. Handlers must be short
/// and must not block.
pub trait PhaseHandler: Send + Sync {
    fn phase(&self) -> CognitivePhase;

    fn run(
        &self,
        state: &mut AgentState,
        store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError>;
}

/// One handler per phase.
pub struct PhaseRegistry {
    handlers: [Arc<dyn PhaseHandler>; CognitivePhase::COUNT],
}

impl PhaseRegistry {
    /// Registry holding the built-in handlers.
    pub fn builtin() -> Self {
        Self {
            handlers: [
                Arc::new(PerceptionPhase),
                Arc::new(AttentionPhase),
                Arc::new(ReasoningPhase),
                Arc::new(PlanningPhase),
                Arc::new(ExecutionPhase),
                Arc::new(LearningPhase),
                Arc::new(ReflectionPhase),
            ],
        }
    }

    /// Install `handler` for its phase and return the one it replaces.
    pub fn register(&mut self, handler: Arc<dyn PhaseHandler>) -> Arc<dyn PhaseHandler> {
        let slot = &mut self.handlers[handler.phase().index()];
        std::mem::replace(slot, handler)
    }

    pub fn get(&self, phase: CognitivePhase) -> Arc<dyn PhaseHandler> {
        Arc::clone(&self.handlers[phase.index()])
    }
}

impl Default for PhaseRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Run `handler` against a copy of the agent's state, then advance the phase
/// and commit. The commit is the handler's last visible effect.
///
/// The handler runs without the agent table lock, so only what it changed
/// relative to its copy is written back. Goals and beliefs added by other
/// callers in the meantime survive.
pub(crate) fn execute(
    handler: &dyn PhaseHandler,
    agents: &AgentTable,
    store: &KnowledgeStore,
    agent_id: &str,
    context: &mut CognitiveContext,
) -> Result<AgentState, KernelError> {
    let phase = handler.phase();
    tracing::debug!(agent = agent_id, %phase, "Processing phase");

    let base = agents.get(agent_id)?;
    let mut draft = base.clone();
    handler.run(&mut draft, store, context)?;
    agents.modify(agent_id, move |current| {
        apply_changes(current, &base, draft);
        current.current_phase = phase.next();
    })
}

/// Apply the edits that turned `base` into `draft` onto `current`.
///
/// Goals and beliefs merge per entry. Intentions and focus atoms are
/// replaced wholesale, and only when the handler touched them.
fn apply_changes(current: &mut AgentState, base: &AgentState, draft: AgentState) {
    let AgentState {
        goals,
        beliefs,
        intentions,
        focus_atoms,
        ..
    } = draft;

    current.goals.retain(|goal| goals.contains(goal) || !base.goals.contains(goal));
    for goal in goals {
        if !base.goals.contains(&goal) {
            current.push_goal(goal);
        }
    }

    for key in base.beliefs.keys() {
        if !beliefs.contains_key(key) {
            current.beliefs.remove(key);
        }
    }
    for (key, value) in beliefs {
        if base.beliefs.get(&key) != Some(&value) {
            current.beliefs.insert(key, value);
        }
    }

    if intentions != base.intentions {
        current.intentions = intentions;
    }
    if focus_atoms != base.focus_atoms {
        current.focus_atoms = focus_atoms;
    }
}
