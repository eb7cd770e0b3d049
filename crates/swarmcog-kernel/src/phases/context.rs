use std::collections::BTreeMap;

use swarmcog_core::{AgentId, AtomId};

use crate::scheduler::CycleId;

/// Scratch space shared by the phases of one cycle.
///
/// Ad-hoc phase tasks get a fresh context seeded from their parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CognitiveContext {
    pub agent_id: AgentId,
    pub cycle_id: Option<CycleId>,
    pub variables: BTreeMap<String, String>,
    pub focus_atoms: Vec<AtomId>,
    /// Set by Execution, read by Learning and Reflection.
    pub actions_executed: Option<usize>,
    pub performance_score: Option<f64>,
}

impl CognitiveContext {
    pub fn new(agent_id: impl Into<AgentId>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Self::default()
        }
    }

    pub fn for_cycle(agent_id: impl Into<AgentId>, cycle_id: CycleId) -> Self {
        Self {
            cycle_id: Some(cycle_id),
            ..Self::new(agent_id)
        }
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.variables.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Executed-action count, falling back to the `actions_executed` variable
    /// so parameters of an ad-hoc task can drive Learning and Reflection.
    pub fn executed_count(&self) -> usize {
        self.actions_executed
            .or_else(|| self.get("actions_executed")?.parse().ok())
            .unwrap_or(0)
    }
}
