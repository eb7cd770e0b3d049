use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{AtomId, AtomType};

/// Secondary indices over live atoms. Only touched under the map write lock.
#[derive(Debug, Default)]
pub(crate) struct AtomIndex {
    by_type: HashMap<AtomType, HashSet<AtomId>>,
    by_name: HashMap<String, HashSet<AtomId>>,
}

impl AtomIndex {
    pub fn insert(&mut self, id: &AtomId, atom_type: AtomType, name: &str) {
        self.by_type
            .entry(atom_type)
            .or_default()
            .insert(id.clone());
        self.by_name
            .entry(name.to_string())
            .or_default()
            .insert(id.clone());
    }

    /// Remove an id, dropping sets that become empty.
    pub fn remove(&mut self, id: &AtomId, atom_type: AtomType, name: &str) {
        if let Some(ids) = self.by_type.get_mut(&atom_type) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_type.remove(&atom_type);
            }
        }
        if let Some(ids) = self.by_name.get_mut(name) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_name.remove(name);
            }
        }
    }

    pub fn of_type(&self, atom_type: AtomType) -> Option<&HashSet<AtomId>> {
        self.by_type.get(&atom_type)
    }

    pub fn named(&self, name: &str) -> Option<&HashSet<AtomId>> {
        self.by_name.get(name)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn type_counts(&self) -> BTreeMap<AtomType, usize> {
        self.by_type
            .iter()
            .map(|(t, ids)| (*t, ids.len()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
        self.by_name.clear();
    }

    /// Every (id, type) pair held by the type index.
    pub fn type_entries(&self) -> impl Iterator<Item = (&AtomId, AtomType)> {
        self.by_type
            .iter()
            .flat_map(|(t, ids)| ids.iter().map(move |id| (id, *t)))
    }

    /// Every (id, name) pair held by the name index.
    pub fn name_entries(&self) -> impl Iterator<Item = (&AtomId, &str)> {
        self.by_name
            .iter()
            .flat_map(|(n, ids)| ids.iter().map(move |id| (id, n.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove_drop_empty_sets() {
        let mut index = AtomIndex::default();
        let id = AtomId::from("a");
        index.insert(&id, AtomType::GoalNode, "ship");
        assert!(index.of_type(AtomType::GoalNode).unwrap().contains(&id));
        assert!(index.named("ship").unwrap().contains(&id));

        index.remove(&id, AtomType::GoalNode, "ship");
        assert!(index.of_type(AtomType::GoalNode).is_none());
        assert!(!index.has_name("ship"));
        assert!(index.type_counts().is_empty());
    }
}
