use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::AtomId;

/// Agents are addressed by caller-chosen string ids.
pub type AgentId = String;

/// The seven stages of a cognitive cycle, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitivePhase {
    Perception,
    Attention,
    Reasoning,
    Planning,
    Execution,
    Learning,
    Reflection,
}

impl CognitivePhase {
    pub const COUNT: usize = 7;

    pub const ALL: [CognitivePhase; Self::COUNT] = [
        CognitivePhase::Perception,
        CognitivePhase::Attention,
        CognitivePhase::Reasoning,
        CognitivePhase::Planning,
        CognitivePhase::Execution,
        CognitivePhase::Learning,
        CognitivePhase::Reflection,
    ];

    /// Position in the cycle, Perception = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The phase that follows this one. Reflection wraps to Perception.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CognitivePhase::Perception => "perception",
            CognitivePhase::Attention => "attention",
            CognitivePhase::Reasoning => "reasoning",
            CognitivePhase::Planning => "planning",
            CognitivePhase::Execution => "execution",
            CognitivePhase::Learning => "learning",
            CognitivePhase::Reflection => "reflection",
        }
    }
}

impl std::fmt::Display for CognitivePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-agent record advanced by the cognitive cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: AgentId,
    pub current_phase: CognitivePhase,
    /// Ordered, without duplicates.
    pub goals: Vec<String>,
    pub beliefs: BTreeMap<String, String>,
    pub intentions: Vec<String>,
    pub focus_atoms: Vec<AtomId>,
    pub last_update: DateTime<Utc>,
}

impl AgentState {
    pub fn new(agent_id: impl Into<AgentId>) -> Self {
        Self {
            agent_id: agent_id.into(),
            current_phase: CognitivePhase::Perception,
            goals: Vec::new(),
            beliefs: BTreeMap::new(),
            intentions: Vec::new(),
            focus_atoms: Vec::new(),
            last_update: Utc::now(),
        }
    }

    /// Append a goal unless it is already present. Returns whether it was added.
    pub fn push_goal(&mut self, goal: impl Into<String>) -> bool {
        let goal = goal.into();
        if self.goals.contains(&goal) {
            return false;
        }
        self.goals.push(goal);
        true
    }
}
