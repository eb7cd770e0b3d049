use super::store::KnowledgeStore;
use crate::error::CoreError;
use crate::model::{Atom, AtomId, AtomType};

impl KnowledgeStore {
    /// Endpoints on the other side of every binary collaboration link touching `agent`.
    pub fn get_collaborators(&self, agent: &AtomId) -> Vec<AtomId> {
        let table = self.table.read();
        table
            .of_type(AtomType::CollaborationLink)
            .iter()
            .filter_map(|link| match link.outgoing() {
                [a, b] if a == agent => Some(b.clone()),
                [a, b] if b == agent => Some(a.clone()),
                _ => None,
            })
            .collect()
    }

    /// Strength of the first binary trust link between `a` and `b` in either
    /// direction, or `None` when no such link exists.
    pub fn trust_level(&self, a: &AtomId, b: &AtomId) -> Option<f64> {
        let table = self.table.read();
        table
            .of_type(AtomType::TrustLink)
            .iter()
            .find(|link| match link.outgoing() {
                [x, y] => (x == a && y == b) || (x == b && y == a),
                _ => false,
            })
            .map(|link| link.truth().strength)
    }

    /// Like [`trust_level`](Self::trust_level), defaulting to 0.0.
    pub fn get_trust_level(&self, a: &AtomId, b: &AtomId) -> f64 {
        self.trust_level(a, b).unwrap_or(0.0)
    }

    /// Links whose outgoing set contains `id`, in insertion order.
    pub fn get_incoming(&self, id: &AtomId) -> Vec<Atom> {
        self.entries()
            .iter()
            .filter(|e| e.outgoing().contains(id))
            .map(|e| e.snapshot())
            .collect()
    }

    /// Resolve a link's endpoints. Fails with `NotFound` on the first dangling id.
    pub fn resolve_outgoing(&self, link_id: &AtomId) -> Result<Vec<Atom>, CoreError> {
        let table = self.table.read();
        let link = table.get(link_id)?;
        if !link.atom_type.is_link() {
            return Err(CoreError::InvalidArgument(format!(
                "{link_id} is a {} node, not a link",
                link.atom_type
            )));
        }
        link.outgoing()
            .iter()
            .map(|id| table.get(id).map(|entry| entry.snapshot()))
            .collect()
    }
}
