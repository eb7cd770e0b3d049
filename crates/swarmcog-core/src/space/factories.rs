use chrono::Utc;

use super::store::KnowledgeStore;
use crate::error::CoreError;
use crate::model::{Atom, AtomId, AtomType, AttentionValue, TruthValue};

/// Default truth confidence of a goal node; strength carries the priority.
pub const GOAL_CONFIDENCE: f64 = 0.8;
/// Default truth of a belief node.
pub const BELIEF_TRUTH: (f64, f64) = (0.8, 0.7);
/// Default attention of a memory node.
pub const MEMORY_ATTENTION: (f64, f64, f64) = (0.5, 0.0, 0.3);
/// Confidence given to a trust link's truth value.
pub const TRUST_CONFIDENCE: f64 = 0.5;

impl KnowledgeStore {
    /// Add an agent node. The name is made unique (`name`, `name_1`, ...).
    pub fn add_agent_node(&self, name: &str, capabilities: &[String]) -> Result<Atom, CoreError> {
        let atom = Atom::node(self.next_id(), AtomType::AgentNode, name, None)
            .with_metadata("type", "cognitive_agent")
            .with_metadata("creation_time", Utc::now().to_rfc3339())
            .with_metadata("capabilities", capabilities.join(","));
        atom.validate()?;

        let mut table = self.table.write();
        let mut atom = atom;
        atom.name = table.unique_name(&atom.name);
        let snapshot = atom.clone();
        table.insert(atom)?;
        drop(table);

        tracing::info!(agent = %snapshot.name, id = %snapshot.id, "Created agent node");
        Ok(snapshot)
    }

    pub fn add_capability_node(&self, name: &str, description: &str) -> Result<Atom, CoreError> {
        let value = (!description.is_empty()).then(|| description.to_string());
        let atom = Atom::node(self.next_id(), AtomType::CapabilityNode, name, value);
        self.insert_snapshot(atom)
    }

    /// Goal nodes carry their priority as truth strength.
    pub fn add_goal_node(&self, goal: &str, priority: f64) -> Result<Atom, CoreError> {
        let truth = TruthValue::try_new(priority, GOAL_CONFIDENCE)
            .map_err(|_| {
                CoreError::InvalidArgument(format!("goal priority out of range: {priority}"))
            })?;
        let atom = Atom::node(self.next_id(), AtomType::GoalNode, goal, None).with_truth(truth);
        self.insert_snapshot(atom)
    }

    pub fn add_belief_node(&self, belief: &str, value: &str) -> Result<Atom, CoreError> {
        let value = (!value.is_empty()).then(|| value.to_string());
        let atom = Atom::node(self.next_id(), AtomType::BeliefNode, belief, value)
            .with_truth(TruthValue::new(BELIEF_TRUTH.0, BELIEF_TRUTH.1));
        self.insert_snapshot(atom)
    }

    /// Memory nodes are named `memory_<short id>` and hold their content as value.
    pub fn add_memory_node(&self, content: &str, memory_type: &str) -> Result<Atom, CoreError> {
        let id = self.next_id();
        let name = format!("memory_{}", id.short());
        let (sti, lti, vlti) = MEMORY_ATTENTION;
        let atom = Atom::node(id, AtomType::MemoryNode, name, Some(content.to_string()))
            .with_metadata("memory_type", memory_type)
            .with_attention(AttentionValue::new(sti, lti, vlti));
        self.insert_snapshot(atom)
    }

    pub fn add_collaboration_link(
        &self,
        agent1: &AtomId,
        agent2: &AtomId,
        collaboration_type: &str,
    ) -> Result<Atom, CoreError> {
        let atom = Atom::link(
            self.next_id(),
            AtomType::CollaborationLink,
            vec![agent1.clone(), agent2.clone()],
            "",
        )
        .with_metadata("collaboration_type", collaboration_type)
        .with_metadata("created_time", Utc::now().to_rfc3339());
        self.insert_link(atom)
    }

    /// Trust links store the level as truth strength. Levels outside [0, 1] are rejected.
    pub fn add_trust_relationship(
        &self,
        agent1: &AtomId,
        agent2: &AtomId,
        trust_level: f64,
    ) -> Result<Atom, CoreError> {
        let truth = TruthValue::try_new(trust_level, TRUST_CONFIDENCE).map_err(|_| {
            CoreError::InvalidArgument(format!("trust level out of range: {trust_level}"))
        })?;
        let atom = Atom::link(
            self.next_id(),
            AtomType::TrustLink,
            vec![agent1.clone(), agent2.clone()],
            "",
        )
        .with_truth(truth)
        .with_metadata("trust_level", trust_level.to_string());
        self.insert_link(atom)
    }

    pub fn add_knowledge_link(
        &self,
        source: &AtomId,
        target: &AtomId,
        relation: &str,
    ) -> Result<Atom, CoreError> {
        let atom = Atom::link(
            self.next_id(),
            AtomType::KnowledgeLink,
            vec![source.clone(), target.clone()],
            "",
        )
        .with_metadata("relation", relation);
        self.insert_link(atom)
    }

    fn insert_snapshot(&self, atom: Atom) -> Result<Atom, CoreError> {
        let snapshot = atom.clone();
        self.add_atom(atom)?;
        Ok(snapshot)
    }

    /// Insert a link after checking, under the same write lock, that every
    /// endpoint is live.
    fn insert_link(&self, atom: Atom) -> Result<Atom, CoreError> {
        atom.validate()?;
        let snapshot = atom.clone();
        let mut table = self.table.write();
        if let Some(missing) = atom.outgoing().iter().find(|id| !table.atoms.contains_key(*id)) {
            tracing::warn!(
                atom_type = %atom.atom_type,
                endpoint = %missing,
                "Cannot create link: endpoint not found"
            );
            return Err(CoreError::not_found(missing));
        }
        table.insert(atom)?;
        drop(table);
        tracing::debug!("Added link: {snapshot}");
        Ok(snapshot)
    }
}
