use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use swarmcog_core::{AgentId, CognitivePhase};
use uuid::Uuid;

pub type TaskId = String;
pub type CycleId = u64;

/// Position of a task inside one cycle invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CycleTicket {
    pub cycle_id: CycleId,
    pub step: usize,
}

/// A unit of work binding an agent, a phase and parameters.
#[derive(Debug, Clone)]
pub struct CognitiveTask {
    pub id: TaskId,
    pub agent_id: AgentId,
    pub phase: CognitivePhase,
    pub description: String,
    pub parameters: BTreeMap<String, String>,
    /// Higher runs first.
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
    pub(crate) ticket: Option<CycleTicket>,
}

impl CognitiveTask {
    /// A task for `phase` at that phase's default priority.
    pub fn new(agent_id: impl Into<AgentId>, phase: CognitivePhase) -> Self {
        let now = Utc::now();
        Self {
            id: generate_task_id(),
            agent_id: agent_id.into(),
            phase,
            description: format!("Cognitive phase: {phase}"),
            parameters: BTreeMap::new(),
            priority: phase_priority(phase),
            created_at: now,
            scheduled_at: now,
            ticket: None,
        }
    }

    pub fn with_parameters(mut self, parameters: BTreeMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The cycle this task belongs to, if it was scheduled by a cycle run.
    pub fn cycle_id(&self) -> Option<CycleId> {
        self.ticket.map(|t| t.cycle_id)
    }

    pub(crate) fn in_cycle(mut self, cycle_id: CycleId) -> Self {
        self.ticket = Some(CycleTicket {
            cycle_id,
            step: self.phase.index(),
        });
        self
    }
}

/// Strictly decreasing with phase index: Perception = 7 ... Reflection = 1.
pub fn phase_priority(phase: CognitivePhase) -> i32 {
    (CognitivePhase::COUNT - phase.index()) as i32
}

/// `task_` followed by eight hex characters.
pub fn generate_task_id() -> TaskId {
    let hex = Uuid::new_v4().simple().to_string();
    format!("task_{}", &hex[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priorities_decrease_through_the_cycle() {
        let priorities: Vec<i32> = CognitivePhase::ALL.iter().map(|p| phase_priority(*p)).collect();
        assert_eq!(priorities, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_task_id_shape() {
        let id = generate_task_id();
        assert_eq!(id.len(), 13);
        assert!(id.starts_with("task_"));
        assert!(id[5..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cycle_ticket_follows_phase() {
        let task = CognitiveTask::new("a1", CognitivePhase::Planning).in_cycle(9);
        assert_eq!(task.cycle_id(), Some(9));
        assert_eq!(task.ticket.map(|t| t.step), Some(3));
        assert_eq!(task.description, "Cognitive phase: planning");
    }
}
