use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::entry::AtomEntry;
use super::focus::AttentionalFocus;
use super::index::AtomIndex;
use crate::error::CoreError;
use crate::model::{Atom, AtomId, AtomType, IdGenerator, UuidIdGenerator};

/// Atom map plus its indices. Always mutated together under one write lock.
#[derive(Default)]
pub(crate) struct AtomTable {
    pub atoms: HashMap<AtomId, Arc<AtomEntry>>,
    pub index: AtomIndex,
    next_seq: u64,
}

impl AtomTable {
    pub fn insert(&mut self, atom: Atom) -> Result<AtomId, CoreError> {
        if self.atoms.contains_key(&atom.id) {
            return Err(CoreError::InvalidArgument(format!(
                "atom id already in use: {}",
                atom.id
            )));
        }
        let id = atom.id.clone();
        self.next_seq += 1;
        let entry = AtomEntry::new(atom, self.next_seq);
        self.index.insert(&entry.id, entry.atom_type, &entry.name);
        self.atoms.insert(id.clone(), Arc::new(entry));
        Ok(id)
    }

    pub fn get(&self, id: &AtomId) -> Result<&Arc<AtomEntry>, CoreError> {
        self.atoms.get(id).ok_or_else(|| CoreError::not_found(id))
    }

    /// Entries for a set of ids in insertion order.
    pub fn resolve<'a>(&self, ids: impl IntoIterator<Item = &'a AtomId>) -> Vec<Arc<AtomEntry>> {
        let mut entries: Vec<Arc<AtomEntry>> = ids
            .into_iter()
            .filter_map(|id| self.atoms.get(id).cloned())
            .collect();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    pub fn of_type(&self, atom_type: AtomType) -> Vec<Arc<AtomEntry>> {
        match self.index.of_type(atom_type) {
            Some(ids) => self.resolve(ids),
            None => Vec::new(),
        }
    }

    /// `base`, or the first free `base_N` for N = 1, 2, ...
    pub fn unique_name(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while self.index.has_name(&candidate) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        candidate
    }
}

/// Thread-safe store that owns every atom.
///
/// Reads return point-in-time copies. Links refer to other atoms by id, so
/// removing an atom never cascades; resolving a removed id yields `NotFound`.
pub struct KnowledgeStore {
    name: String,
    ids: Arc<dyn IdGenerator>,
    pub(crate) table: RwLock<AtomTable>,
    pub(crate) focus: Mutex<AttentionalFocus>,
}

impl KnowledgeStore {
    /// Create an empty store that mints UUID atom ids.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id_generator(name, Arc::new(UuidIdGenerator))
    }

    /// Create an empty store with an injected id source.
    pub fn with_id_generator(name: impl Into<String>, ids: Arc<dyn IdGenerator>) -> Self {
        let name = name.into();
        tracing::info!(space = %name, "Created knowledge store");
        Self {
            name,
            ids,
            table: RwLock::new(AtomTable::default()),
            focus: Mutex::new(AttentionalFocus::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mint a fresh id from the injected generator.
    pub fn next_id(&self) -> AtomId {
        self.ids.next_id()
    }

    /// Add a validated atom. Index maintenance happens under the same write lock.
    pub fn add_atom(&self, atom: Atom) -> Result<AtomId, CoreError> {
        atom.validate()?;
        let summary = atom.to_string();
        let id = self.table.write().insert(atom)?;
        tracing::debug!("Added atom: {summary}");
        Ok(id)
    }

    /// Remove an atom and return its last state. Links pointing at it are left alone.
    pub fn remove_atom(&self, id: &AtomId) -> Result<Atom, CoreError> {
        let entry = {
            let mut table = self.table.write();
            let entry = table
                .atoms
                .remove(id)
                .ok_or_else(|| CoreError::not_found(id))?;
            table.index.remove(&entry.id, entry.atom_type, &entry.name);
            entry
        };
        tracing::debug!(atom = %id, "Removed atom");
        Ok(entry.snapshot())
    }

    pub fn get_atom(&self, id: &AtomId) -> Result<Atom, CoreError> {
        let table = self.table.read();
        table.get(id).map(|entry| entry.snapshot())
    }

    pub fn contains(&self, id: &AtomId) -> bool {
        self.table.read().atoms.contains_key(id)
    }

    /// All atoms in insertion order.
    pub fn get_atoms(&self) -> Vec<Atom> {
        self.entries().iter().map(|e| e.snapshot()).collect()
    }

    pub fn get_atoms_by_type(&self, atom_type: AtomType) -> Vec<Atom> {
        let table = self.table.read();
        table
            .of_type(atom_type)
            .iter()
            .map(|e| e.snapshot())
            .collect()
    }

    pub fn get_atoms_by_name(&self, name: &str) -> Vec<Atom> {
        let table = self.table.read();
        match table.index.named(name) {
            Some(ids) => table.resolve(ids).iter().map(|e| e.snapshot()).collect(),
            None => Vec::new(),
        }
    }

    /// Atoms of a type, optionally restricted to one name.
    pub fn find_atoms(&self, atom_type: AtomType, name: Option<&str>) -> Vec<Atom> {
        match name {
            None | Some("") => self.get_atoms_by_type(atom_type),
            Some(name) => {
                let table = self.table.read();
                let Some(ids) = table.index.named(name) else {
                    return Vec::new();
                };
                table
                    .resolve(ids)
                    .iter()
                    .filter(|e| e.atom_type == atom_type)
                    .map(|e| e.snapshot())
                    .collect()
            }
        }
    }

    pub fn atom_count(&self) -> usize {
        self.table.read().atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }

    /// Drop every atom and empty the attentional focus.
    pub fn clear(&self) {
        let mut table = self.table.write();
        let mut focus = self.focus.lock();
        table.atoms.clear();
        table.index.clear();
        focus.clear();
        tracing::info!(space = %self.name, "Cleared knowledge store");
    }

    /// Counts keyed by `total_atoms`, `attentional_focus_size` and `type_<name>`.
    pub fn statistics(&self) -> BTreeMap<String, usize> {
        let table = self.table.read();
        let mut stats = BTreeMap::new();
        stats.insert("total_atoms".to_string(), table.atoms.len());
        for (atom_type, count) in table.index.type_counts() {
            stats.insert(format!("type_{atom_type}"), count);
        }
        drop(table);
        stats.insert(
            "attentional_focus_size".to_string(),
            self.focus.lock().len(),
        );
        stats
    }

    /// Describe every mismatch between the atom map and its indices.
    /// An empty result means each live atom sits in exactly its own type and
    /// name sets and the indices hold nothing else.
    pub fn index_violations(&self) -> Vec<String> {
        let table = self.table.read();
        let mut problems = Vec::new();

        for (id, atom_type) in table.index.type_entries() {
            match table.atoms.get(id) {
                Some(entry) if entry.atom_type == atom_type => {}
                Some(entry) => problems.push(format!(
                    "{id} indexed as {atom_type} but is {}",
                    entry.atom_type
                )),
                None => problems.push(format!("{id} in type index {atom_type} but not live")),
            }
        }
        for (id, name) in table.index.name_entries() {
            match table.atoms.get(id) {
                Some(entry) if entry.name == name => {}
                Some(entry) => problems.push(format!(
                    "{id} indexed under name {name:?} but is named {:?}",
                    entry.name
                )),
                None => problems.push(format!("{id} in name index {name:?} but not live")),
            }
        }
        for (id, entry) in &table.atoms {
            let typed = table
                .index
                .of_type(entry.atom_type)
                .is_some_and(|ids| ids.contains(id));
            let named = table
                .index
                .named(&entry.name)
                .is_some_and(|ids| ids.contains(id));
            if !typed || !named {
                problems.push(format!("{id} missing from its index sets"));
            }
        }
        problems
    }

    /// Shared handles to every entry in insertion order. The map lock is
    /// released before this returns.
    pub(crate) fn entries(&self) -> Vec<Arc<AtomEntry>> {
        let table = self.table.read();
        let mut entries: Vec<Arc<AtomEntry>> = table.atoms.values().cloned().collect();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    pub(crate) fn entry(&self, id: &AtomId) -> Result<Arc<AtomEntry>, CoreError> {
        self.table.read().get(id).cloned()
    }
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::new("default_space")
    }
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("name", &self.name)
            .field("atoms", &self.atom_count())
            .finish()
    }
}
