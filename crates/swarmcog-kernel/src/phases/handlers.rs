use chrono::Utc;
use swarmcog_core::{AgentState, AtomType, CognitivePhase, KnowledgeStore};

use super::{CognitiveContext, PhaseHandler};
use crate::error::KernelError;

/// Atoms pulled into the attentional focus by each Attention phase.
pub const ATTENTION_SELECTION: usize = 5;
/// Intentions acted on by each Execution phase.
pub const EXECUTION_LIMIT: usize = 3;

const SUCCESS_SCORE: f64 = 0.8;
const IDLE_SCORE: f64 = 0.3;

/// Copies the store's attentional focus into the context.
pub struct PerceptionPhase;

impl PhaseHandler for PerceptionPhase {
    fn phase(&self) -> CognitivePhase {
        CognitivePhase::Perception
    }

    fn run(
        &self,
        _state: &mut AgentState,
        store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError> {
        context.focus_atoms = store
            .attentional_focus()
            .into_iter()
            .filter(|id| store.contains(id))
            .collect();
        context.set("perception_timestamp", Utc::now().to_rfc3339());
        context.set("environment_state", "active");
        Ok(())
    }
}

/// Re-selects the most important atoms and pushes them into the focus, then
/// runs one decay sweep.
pub struct AttentionPhase;

impl PhaseHandler for AttentionPhase {
    fn phase(&self) -> CognitivePhase {
        CognitivePhase::Attention
    }

    fn run(
        &self,
        state: &mut AgentState,
        store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError> {
        let selected: Vec<_> = store
            .get_most_important_atoms(ATTENTION_SELECTION)
            .into_iter()
            .map(|atom| atom.id)
            .collect();
        for id in &selected {
            store.add_to_attentional_focus(id.clone());
        }
        store.update_attention_values();

        context.focus_atoms = selected.clone();
        state.focus_atoms = selected;
        Ok(())
    }
}

/// Summarises goals and known trust toward other agents.
pub struct ReasoningPhase;

impl PhaseHandler for ReasoningPhase {
    fn phase(&self) -> CognitivePhase {
        CognitivePhase::Reasoning
    }

    fn run(
        &self,
        state: &mut AgentState,
        store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError> {
        context.set("active_goals", state.goals.join(","));

        if let Some(me) = store
            .find_atoms(AtomType::AgentNode, Some(state.agent_id.as_str()))
            .into_iter()
            .next()
        {
            for other in store.get_atoms_by_type(AtomType::AgentNode) {
                if other.id == me.id {
                    continue;
                }
                if let Some(level) = store.trust_level(&me.id, &other.id) {
                    context.set(&format!("trust_{}", other.name), level.to_string());
                }
            }
        }

        context.set("reasoning_result", "goal_analysis_complete");
        context.set("reasoning_confidence", "0.8");
        Ok(())
    }
}

/// Derives one intention per goal.
pub struct PlanningPhase;

impl PhaseHandler for PlanningPhase {
    fn phase(&self) -> CognitivePhase {
        CognitivePhase::Planning
    }

    fn run(
        &self,
        state: &mut AgentState,
        _store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError> {
        state.intentions = state
            .goals
            .iter()
            .map(|goal| format!("plan_for_{goal}"))
            .collect();
        context.set("action_plans", state.intentions.join(","));
        Ok(())
    }
}

/// Acts on at most [`EXECUTION_LIMIT`] intentions and records how many.
pub struct ExecutionPhase;

impl PhaseHandler for ExecutionPhase {
    fn phase(&self) -> CognitivePhase {
        CognitivePhase::Execution
    }

    fn run(
        &self,
        state: &mut AgentState,
        _store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError> {
        let mut executed = 0;
        for plan in state.intentions.iter().take(EXECUTION_LIMIT) {
            tracing::debug!(agent = %state.agent_id, plan = %plan, "Executing action plan");
            executed += 1;
        }
        context.actions_executed = Some(executed);
        context.set("actions_executed", executed.to_string());
        Ok(())
    }
}

/// The only phase that writes new atoms: one procedural memory per
/// cycle that executed something.
pub struct LearningPhase;

impl PhaseHandler for LearningPhase {
    fn phase(&self) -> CognitivePhase {
        CognitivePhase::Learning
    }

    fn run(
        &self,
        _state: &mut AgentState,
        store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError> {
        let executed = context.executed_count();
        if executed > 0 {
            let content = format!("Executed {executed} actions successfully");
            let memory = store.add_memory_node(&content, "procedural")?;
            context.set("learning_outcome", "knowledge_updated");
            context.set("memory_atom", memory.id.to_string());
        }
        Ok(())
    }
}

pub struct ReflectionPhase;

impl PhaseHandler for ReflectionPhase {
    fn phase(&self) -> CognitivePhase {
        CognitivePhase::Reflection
    }

    fn run(
        &self,
        state: &mut AgentState,
        _store: &KnowledgeStore,
        context: &mut CognitiveContext,
    ) -> Result<(), KernelError> {
        let score = if context.executed_count() > 0 {
            SUCCESS_SCORE
        } else {
            IDLE_SCORE
        };
        context.performance_score = Some(score);
        context.set("performance_score", score.to_string());
        context.set("reflection_complete", "true");
        tracing::debug!(agent = %state.agent_id, score, "Performance evaluated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use swarmcog_core::{Atom, AttentionValue};

    use super::*;

    fn agent(goals: &[&str]) -> AgentState {
        let mut state = AgentState::new("a1");
        for goal in goals {
            state.push_goal(*goal);
        }
        state
    }

    #[test]
    fn test_attention_pushes_top_atoms_into_focus() {
        let store = KnowledgeStore::new("phases");
        let mut ids = Vec::new();
        for i in 0..7 {
            let atom = Atom::node(store.next_id(), AtomType::Node, format!("n{i}"), None)
                .with_attention(AttentionValue::new(i as f64 / 10.0, 0.0, 0.0));
            ids.push(store.add_atom(atom).unwrap());
        }

        let mut state = agent(&[]);
        let mut context = CognitiveContext::new("a1");
        AttentionPhase.run(&mut state, &store, &mut context).unwrap();

        let expected: Vec<_> = ids.iter().rev().take(5).cloned().collect();
        assert_eq!(state.focus_atoms, expected);
        assert_eq!(context.focus_atoms, expected);
        assert_eq!(store.attentional_focus(), expected);
        // One decay sweep ran after the selection.
        assert!(store.get_atom(&ids[6]).unwrap().attention.sti < 0.6);
    }

    #[test]
    fn test_perception_skips_removed_focus_atoms() {
        let store = KnowledgeStore::new("phases");
        let kept = store.add_goal_node("kept", 0.5).unwrap().id;
        let gone = store.add_goal_node("gone", 0.5).unwrap().id;
        store.add_to_attentional_focus(kept.clone());
        store.add_to_attentional_focus(gone.clone());
        store.remove_atom(&gone).unwrap();

        let mut context = CognitiveContext::new("a1");
        PerceptionPhase
            .run(&mut agent(&[]), &store, &mut context)
            .unwrap();
        assert_eq!(context.focus_atoms, vec![kept]);
        assert_eq!(context.get("environment_state"), Some("active"));
    }

    #[test]
    fn test_planning_then_execution_caps_at_limit() {
        let store = KnowledgeStore::new("phases");
        let mut state = agent(&["a", "b", "c", "d"]);
        let mut context = CognitiveContext::new("a1");

        PlanningPhase.run(&mut state, &store, &mut context).unwrap();
        assert_eq!(
            state.intentions,
            vec!["plan_for_a", "plan_for_b", "plan_for_c", "plan_for_d"]
        );

        ExecutionPhase.run(&mut state, &store, &mut context).unwrap();
        assert_eq!(context.actions_executed, Some(EXECUTION_LIMIT));
    }

    #[test]
    fn test_learning_writes_memory_only_when_something_ran() {
        let store = KnowledgeStore::new("phases");
        let mut state = agent(&[]);

        let mut idle = CognitiveContext::new("a1");
        idle.actions_executed = Some(0);
        LearningPhase.run(&mut state, &store, &mut idle).unwrap();
        assert!(store.is_empty());

        let mut busy = CognitiveContext::new("a1");
        busy.actions_executed = Some(2);
        LearningPhase.run(&mut state, &store, &mut busy).unwrap();
        let memories = store.get_atoms_by_type(AtomType::MemoryNode);
        assert_eq!(memories.len(), 1);
        assert_eq!(memories[0].value(), Some("Executed 2 actions successfully"));
        assert_eq!(memories[0].metadata("memory_type"), Some("procedural"));
    }

    #[test]
    fn test_reflection_scores_activity() {
        let store = KnowledgeStore::new("phases");
        let mut state = agent(&[]);

        let mut context = CognitiveContext::new("a1");
        ReflectionPhase.run(&mut state, &store, &mut context).unwrap();
        assert_eq!(context.performance_score, Some(IDLE_SCORE));

        context.actions_executed = Some(1);
        ReflectionPhase.run(&mut state, &store, &mut context).unwrap();
        assert_eq!(context.performance_score, Some(SUCCESS_SCORE));
        assert_eq!(context.get("reflection_complete"), Some("true"));
    }

    #[test]
    fn test_reasoning_records_trust_toward_other_agents() {
        let store = KnowledgeStore::new("phases");
        let me = store.add_agent_node("a1", &[]).unwrap().id;
        let peer = store.add_agent_node("peer", &[]).unwrap().id;
        store.add_agent_node("stranger", &[]).unwrap();
        store.add_trust_relationship(&me, &peer, 0.7).unwrap();

        let mut state = agent(&["g1", "g2"]);
        let mut context = CognitiveContext::new("a1");
        ReasoningPhase.run(&mut state, &store, &mut context).unwrap();

        assert_eq!(context.get("active_goals"), Some("g1,g2"));
        assert_eq!(context.get("trust_peer"), Some("0.7"));
        assert_eq!(context.get("trust_stranger"), None);
    }
}
