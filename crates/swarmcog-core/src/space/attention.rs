use std::cmp::Ordering;

use super::store::KnowledgeStore;
use crate::error::CoreError;
use crate::model::{Atom, AtomId, AttentionValue, TruthValue};

impl KnowledgeStore {
    /// Atoms ranked by `sti + lti + vlti`, highest first.
    ///
    /// The sort is stable over insertion order, so equal scores keep the
    /// order in which the atoms were added.
    pub fn get_most_important_atoms(&self, limit: usize) -> Vec<Atom> {
        let mut ranked: Vec<(f64, Atom)> = self
            .entries()
            .iter()
            .map(|entry| {
                let atom = entry.snapshot();
                (atom.attention.importance(), atom)
            })
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        ranked.truncate(limit);
        ranked.into_iter().map(|(_, atom)| atom).collect()
    }

    /// Apply one decay step to every atom. Returns the number of atoms swept.
    ///
    /// Each atom is updated under its own lock; the map lock is only held
    /// long enough to collect the entries.
    pub fn update_attention_values(&self) -> usize {
        let entries = self.entries();
        for entry in &entries {
            entry.with_payload(|p| p.attention = p.attention.decayed());
        }
        tracing::trace!(atoms = entries.len(), "Attention decay sweep");
        entries.len()
    }

    /// Add deltas to an atom's attention, clamped into range.
    pub fn stimulate(
        &self,
        id: &AtomId,
        sti_delta: f64,
        lti_delta: f64,
        vlti_delta: f64,
    ) -> Result<AttentionValue, CoreError> {
        let entry = self.entry(id)?;
        Ok(entry.with_payload(|p| {
            p.attention = p.attention.stimulated(sti_delta, lti_delta, vlti_delta);
            p.attention
        }))
    }

    pub fn set_attention_value(&self, id: &AtomId, value: AttentionValue) -> Result<(), CoreError> {
        value.validate()?;
        let entry = self.entry(id)?;
        entry.with_payload(|p| p.attention = value);
        Ok(())
    }

    pub fn set_truth_value(&self, id: &AtomId, value: TruthValue) -> Result<(), CoreError> {
        value.validate()?;
        let entry = self.entry(id)?;
        entry.with_payload(|p| p.truth = value);
        Ok(())
    }

    pub fn set_metadata(
        &self,
        id: &AtomId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        let entry = self.entry(id)?;
        let (key, value) = (key.into(), value.into());
        entry.with_payload(|p| {
            p.metadata.insert(key, value);
        });
        Ok(())
    }

    pub fn get_metadata(&self, id: &AtomId, key: &str) -> Result<Option<String>, CoreError> {
        let entry = self.entry(id)?;
        Ok(entry.with_payload(|p| p.metadata.get(key).cloned()))
    }

    /// Push an id onto the attentional focus, evicting the oldest when full.
    pub fn add_to_attentional_focus(&self, id: AtomId) {
        if let Some(evicted) = self.focus.lock().push(id) {
            tracing::trace!(atom = %evicted, "Evicted from attentional focus");
        }
    }

    pub fn remove_from_attentional_focus(&self, id: &AtomId) -> bool {
        self.focus.lock().remove(id)
    }

    /// Current focus, oldest first.
    pub fn attentional_focus(&self) -> Vec<AtomId> {
        self.focus.lock().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{AtomType, SequentialIdGenerator};
    use crate::space::FOCUS_CAPACITY;

    fn store() -> KnowledgeStore {
        KnowledgeStore::with_id_generator("attn", Arc::new(SequentialIdGenerator::new("a")))
    }

    fn add(store: &KnowledgeStore, atom_type: AtomType, name: &str, sti: f64) -> AtomId {
        let atom = Atom::node(store.next_id(), atom_type, name, None)
            .with_attention(AttentionValue::new(sti, 0.0, 0.0));
        store.add_atom(atom).unwrap()
    }

    #[test]
    fn test_most_important_picks_highest_sti() {
        let store = store();
        let x = add(&store, AtomType::AgentNode, "X", 0.9);
        add(&store, AtomType::MemoryNode, "Y", 0.1);

        let top = store.get_most_important_atoms(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, x);
    }

    #[test]
    fn test_most_important_ties_keep_insertion_order() {
        let store = store();
        let first = add(&store, AtomType::Node, "first", 0.4);
        let second = add(&store, AtomType::Node, "second", 0.4);
        let top: Vec<AtomId> = store
            .get_most_important_atoms(10)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(top, vec![first, second]);
    }

    #[test]
    fn test_decay_moves_sti_toward_zero() {
        let store = store();
        let pos = add(&store, AtomType::Node, "pos", 0.8);
        let neg = add(&store, AtomType::Node, "neg", -0.6);

        let mut last_pos = 0.8_f64;
        let mut last_neg = 0.6_f64;
        for _ in 0..200 {
            assert_eq!(store.update_attention_values(), 2);
            let p = store.get_atom(&pos).unwrap().attention.sti.abs();
            let n = store.get_atom(&neg).unwrap().attention.sti.abs();
            assert!(p <= last_pos + 1e-12);
            assert!(n <= last_neg + 1e-12);
            last_pos = p;
            last_neg = n;
        }
        assert!(last_pos < 0.8 * 0.2);
        assert!(last_neg < 0.6 * 0.2);
    }

    #[test]
    fn test_stimulate_clamps_and_requires_atom() {
        let store = store();
        let id = add(&store, AtomType::Node, "n", 0.9);
        let av = store.stimulate(&id, 0.5, 0.0, 0.2).unwrap();
        assert_eq!(av.sti, 1.0);
        assert!((av.vlti - 0.2).abs() < 1e-12);
        assert!(store
            .stimulate(&AtomId::from("missing"), 0.1, 0.0, 0.0)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_setters_validate_and_persist() {
        let store = store();
        let id = add(&store, AtomType::BeliefNode, "b", 0.0);
        store
            .set_truth_value(&id, TruthValue::new(0.3, 0.6))
            .unwrap();
        assert!(store
            .set_truth_value(
                &id,
                TruthValue {
                    strength: -0.1,
                    confidence: 0.5
                }
            )
            .is_err());
        store.set_metadata(&id, "source", "sensor").unwrap();

        let atom = store.get_atom(&id).unwrap();
        assert!(atom.truth.approx_eq(&TruthValue::new(0.3, 0.6)));
        assert_eq!(atom.metadata("source"), Some("sensor"));
        assert_eq!(
            store.get_metadata(&id, "source").unwrap().as_deref(),
            Some("sensor")
        );
    }

    #[test]
    fn test_focus_bound_through_store() {
        let store = store();
        let ids: Vec<AtomId> = (0..FOCUS_CAPACITY + 1)
            .map(|n| add(&store, AtomType::Node, &format!("n{n}"), 0.0))
            .collect();
        for id in &ids {
            store.add_to_attentional_focus(id.clone());
        }
        let focus = store.attentional_focus();
        assert_eq!(focus.len(), FOCUS_CAPACITY);
        assert_eq!(focus.first(), Some(&ids[1]));
        assert!(store.remove_from_attentional_focus(&ids[5]));
        assert_eq!(store.attentional_focus().len(), FOCUS_CAPACITY - 1);
    }
}
