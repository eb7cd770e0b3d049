use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for an atom.
/// Generated as UUID v4 hex (no dashes) unless a different [`IdGenerator`] is injected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtomId(pub String);

impl AtomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used for generated atom names and log lines.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl Default for AtomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AtomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AtomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Source of fresh atom ids. Injected into the store so tests can be deterministic.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> AtomId;
}

/// Default generator: random UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> AtomId {
        AtomId::new()
    }
}

/// Deterministic generator producing `<prefix>-<n>` with a monotonic counter.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> AtomId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        AtomId(format!("{}-{n}", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_id_generation() {
        let id = AtomId::new();
        assert_eq!(id.as_str().len(), 32); // UUID v4 hex, no dashes
        assert_ne!(id, AtomId::new());
    }

    #[test]
    fn test_atom_id_short() {
        let id = AtomId("abcdef1234567890".into());
        assert_eq!(id.short(), "abcdef12");
        let tiny = AtomId("ab".into());
        assert_eq!(tiny.short(), "ab");
    }

    #[test]
    fn test_sequential_generator_never_reuses() {
        let ids = SequentialIdGenerator::new("atom");
        assert_eq!(ids.next_id().as_str(), "atom-1");
        assert_eq!(ids.next_id().as_str(), "atom-2");
        assert_eq!(ids.next_id().as_str(), "atom-3");
    }
}
