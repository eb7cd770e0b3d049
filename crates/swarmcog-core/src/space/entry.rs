use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::model::{Atom, AtomData, AtomId, AtomType, AttentionValue, TruthValue};

/// Mutable part of a stored atom, guarded by the atom's own lock.
#[derive(Debug, Clone)]
pub(crate) struct Payload {
    pub truth: TruthValue,
    pub attention: AttentionValue,
    pub metadata: BTreeMap<String, String>,
}

/// An atom as held by the store: immutable identity plus a locked payload.
#[derive(Debug)]
pub(crate) struct AtomEntry {
    pub id: AtomId,
    pub atom_type: AtomType,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub data: AtomData,
    /// Insertion order, used to keep query results stable.
    pub seq: u64,
    payload: Mutex<Payload>,
}

impl AtomEntry {
    pub fn new(atom: Atom, seq: u64) -> Self {
        Self {
            id: atom.id,
            atom_type: atom.atom_type,
            name: atom.name,
            created_at: atom.created_at,
            data: atom.data,
            seq,
            payload: Mutex::new(Payload {
                truth: atom.truth,
                attention: atom.attention,
                metadata: atom.metadata,
            }),
        }
    }

    pub fn snapshot(&self) -> Atom {
        let payload = self.payload.lock().clone();
        Atom {
            id: self.id.clone(),
            atom_type: self.atom_type,
            name: self.name.clone(),
            truth: payload.truth,
            attention: payload.attention,
            created_at: self.created_at,
            metadata: payload.metadata,
            data: self.data.clone(),
        }
    }

    pub fn outgoing(&self) -> &[AtomId] {
        match &self.data {
            AtomData::Link { outgoing } => outgoing,
            AtomData::Node { .. } => &[],
        }
    }

    pub fn truth(&self) -> TruthValue {
        self.payload.lock().truth
    }

    pub fn attention(&self) -> AttentionValue {
        self.payload.lock().attention
    }

    pub fn with_payload<R>(&self, f: impl FnOnce(&mut Payload) -> R) -> R {
        let mut payload = self.payload.lock();
        f(&mut payload)
    }
}
