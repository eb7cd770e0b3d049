use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::AtomId;
use super::values::{AttentionValue, TruthValue};
use crate::error::CoreError;

/// The type of an atom. Every type has a fixed shape: node or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomType {
    Node,
    Link,
    AgentNode,
    CapabilityNode,
    GoalNode,
    BeliefNode,
    MemoryNode,
    CollaborationLink,
    DelegationLink,
    TrustLink,
    KnowledgeLink,
    EvaluationLink,
}

impl AtomType {
    pub const ALL: [AtomType; 12] = [
        AtomType::Node,
        AtomType::Link,
        AtomType::AgentNode,
        AtomType::CapabilityNode,
        AtomType::GoalNode,
        AtomType::BeliefNode,
        AtomType::MemoryNode,
        AtomType::CollaborationLink,
        AtomType::DelegationLink,
        AtomType::TrustLink,
        AtomType::KnowledgeLink,
        AtomType::EvaluationLink,
    ];

    pub fn is_link(self) -> bool {
        matches!(
            self,
            AtomType::Link
                | AtomType::CollaborationLink
                | AtomType::DelegationLink
                | AtomType::TrustLink
                | AtomType::KnowledgeLink
                | AtomType::EvaluationLink
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AtomType::Node => "node",
            AtomType::Link => "link",
            AtomType::AgentNode => "agent_node",
            AtomType::CapabilityNode => "capability_node",
            AtomType::GoalNode => "goal_node",
            AtomType::BeliefNode => "belief_node",
            AtomType::MemoryNode => "memory_node",
            AtomType::CollaborationLink => "collaboration_link",
            AtomType::DelegationLink => "delegation_link",
            AtomType::TrustLink => "trust_link",
            AtomType::KnowledgeLink => "knowledge_link",
            AtomType::EvaluationLink => "evaluation_link",
        }
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape-specific payload. Links hold ids only; resolution goes through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AtomData {
    Node {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Link {
        outgoing: Vec<AtomId>,
    },
}

/// A point-in-time copy of an atom.
///
/// The store hands these out by value; mutating a copy does not touch the
/// stored atom. Use the store's setters for truth, attention and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub id: AtomId,
    pub atom_type: AtomType,
    pub name: String,
    pub truth: TruthValue,
    pub attention: AttentionValue,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    pub data: AtomData,
}

impl Atom {
    /// Create a node. An empty name becomes `atom_<short id>`.
    pub fn node(
        id: AtomId,
        atom_type: AtomType,
        name: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::build(id, atom_type, name.into(), AtomData::Node { value })
    }

    /// Create a link over the given ordered outgoing ids.
    pub fn link(
        id: AtomId,
        atom_type: AtomType,
        outgoing: Vec<AtomId>,
        name: impl Into<String>,
    ) -> Self {
        Self::build(id, atom_type, name.into(), AtomData::Link { outgoing })
    }

    fn build(id: AtomId, atom_type: AtomType, name: String, data: AtomData) -> Self {
        let name = if name.is_empty() {
            format!("atom_{}", id.short())
        } else {
            name
        };
        Self {
            id,
            atom_type,
            name,
            truth: TruthValue::default(),
            attention: AttentionValue::default(),
            created_at: Utc::now(),
            metadata: BTreeMap::new(),
            data,
        }
    }

    pub fn with_truth(mut self, truth: TruthValue) -> Self {
        self.truth = truth;
        self
    }

    pub fn with_attention(mut self, attention: AttentionValue) -> Self {
        self.attention = attention;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_link(&self) -> bool {
        matches!(self.data, AtomData::Link { .. })
    }

    /// Outgoing ids of a link; empty for nodes.
    pub fn outgoing(&self) -> &[AtomId] {
        match &self.data {
            AtomData::Link { outgoing } => outgoing,
            AtomData::Node { .. } => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.outgoing().len()
    }

    /// Scalar value of a node.
    pub fn value(&self) -> Option<&str> {
        match &self.data {
            AtomData::Node { value } => value.as_deref(),
            AtomData::Link { .. } => None,
        }
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Check everything `KnowledgeStore::add_atom` requires of a new atom.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CoreError::InvalidArgument("atom id is empty".into()));
        }
        validate_name(&self.name)?;
        if self.atom_type.is_link() != self.is_link() {
            return Err(CoreError::InvalidArgument(format!(
                "atom type {} does not match a {} payload",
                self.atom_type,
                if self.is_link() { "link" } else { "node" }
            )));
        }
        if self.outgoing().iter().any(|id| id.as_str().is_empty()) {
            return Err(CoreError::InvalidArgument(
                "link has an empty outgoing id".into(),
            ));
        }
        self.truth.validate()?;
        self.attention.validate()
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::InvalidArgument("atom name is empty".into()));
    }
    if name.chars().any(char::is_control) {
        return Err(CoreError::InvalidArgument(format!(
            "atom name contains control characters: {name:?}"
        )));
    }
    Ok(())
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            AtomData::Node { value } => write!(
                f,
                "Node({}, {}, {}, {})",
                self.id.short(),
                self.atom_type,
                self.name,
                value.as_deref().unwrap_or("")
            ),
            AtomData::Link { outgoing } => {
                let ids: Vec<&str> = outgoing.iter().map(AtomId::short).collect();
                write!(
                    f,
                    "Link({}, {}, {}, [{}])",
                    self.id.short(),
                    self.atom_type,
                    self.name,
                    ids.join(", ")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_gets_default() {
        let atom = Atom::node(AtomId::from("abcdef123456"), AtomType::Node, "", None);
        assert_eq!(atom.name, "atom_abcdef12");
        assert!(atom.validate().is_ok());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let atom = Atom::node(AtomId::new(), AtomType::TrustLink, "t", None);
        assert!(matches!(atom.validate(), Err(CoreError::InvalidArgument(_))));

        let link = Atom::link(AtomId::new(), AtomType::GoalNode, vec![], "g");
        assert!(link.validate().is_err());
    }

    #[test]
    fn test_link_accessors() {
        let a = AtomId::from("a");
        let b = AtomId::from("b");
        let link = Atom::link(
            AtomId::new(),
            AtomType::KnowledgeLink,
            vec![a.clone(), b.clone()],
            "knows",
        );
        assert!(link.is_link());
        assert_eq!(link.arity(), 2);
        assert_eq!(link.outgoing(), &[a, b]);
        assert_eq!(link.value(), None);
    }

    #[test]
    fn test_bad_names_rejected() {
        let mut atom = Atom::node(AtomId::new(), AtomType::Node, "ok", None);
        atom.name = "   ".into();
        assert!(atom.validate().is_err());
        atom.name = "line\nbreak".into();
        assert!(atom.validate().is_err());
    }

    #[test]
    fn test_out_of_range_truth_rejected() {
        let mut atom = Atom::node(AtomId::new(), AtomType::BeliefNode, "b", None);
        atom.truth.strength = 1.2;
        assert!(atom.validate().is_err());
    }

    #[test]
    fn test_atom_serde_roundtrip() {
        let atom = Atom::node(
            AtomId::new(),
            AtomType::MemoryNode,
            "memory_1",
            Some("content".into()),
        )
        .with_metadata("memory_type", "episodic");
        let json = serde_json::to_string(&atom).unwrap();
        assert!(json.contains("\"shape\":\"node\""));
        let parsed: Atom = serde_json::from_str(&json).unwrap();
        assert_eq!(atom, parsed);
    }
}
