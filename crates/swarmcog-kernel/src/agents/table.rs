use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use swarmcog_core::{AgentId, AgentState};

use super::observers::{notify, Observer, ObserverRegistry};
use crate::error::KernelError;

#[derive(Default)]
struct Inner {
    states: BTreeMap<AgentId, AgentState>,
    observers: ObserverRegistry,
}

/// Registered agents and their observers behind one reader/writer lock.
///
/// Every successful state change notifies the agent's observers after the
/// lock has been released, so an observer may call back into the table.
#[derive(Default)]
pub struct AgentTable {
    inner: RwLock<Inner>,
}

impl AgentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent, or return the existing state unchanged if the id is taken.
    pub fn register(
        &self,
        agent_id: &str,
        goals: Vec<String>,
        beliefs: BTreeMap<String, String>,
    ) -> AgentState {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.states.get(agent_id) {
            tracing::warn!(agent = agent_id, "Agent already registered");
            return existing.clone();
        }

        let mut state = AgentState::new(agent_id);
        for goal in goals {
            state.push_goal(goal);
        }
        state.beliefs = beliefs;
        inner.states.insert(agent_id.to_string(), state.clone());
        drop(inner);

        tracing::info!(agent = agent_id, "Added cognitive agent");
        state
    }

    /// Remove an agent and its observers. Returns false if it was unknown.
    pub fn remove(&self, agent_id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.states.remove(agent_id).is_none() {
            return false;
        }
        inner.observers.unregister(agent_id);
        drop(inner);
        tracing::info!(agent = agent_id, "Removed cognitive agent");
        true
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.inner.read().states.contains_key(agent_id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.inner.read().states.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, agent_id: &str) -> Result<AgentState, KernelError> {
        self.inner
            .read()
            .states
            .get(agent_id)
            .cloned()
            .ok_or_else(|| KernelError::agent_not_found(agent_id))
    }

    /// Replace an agent's state wholesale and stamp `last_update`.
    pub fn update(&self, agent_id: &str, state: AgentState) -> Result<(), KernelError> {
        self.modify(agent_id, move |current| *current = state)
            .map(|_| ())
    }

    /// Apply `f` to the live state under the write lock, stamp it and notify.
    /// Returns the state observers were given.
    pub fn modify(
        &self,
        agent_id: &str,
        f: impl FnOnce(&mut AgentState),
    ) -> Result<AgentState, KernelError> {
        let (snapshot, observers) = {
            let mut inner = self.inner.write();
            let current = inner
                .states
                .get_mut(agent_id)
                .ok_or_else(|| KernelError::agent_not_found(agent_id))?;
            f(current);
            current.agent_id = agent_id.to_string();
            current.last_update = Utc::now();
            let snapshot = current.clone();
            (snapshot, inner.observers.for_agent(agent_id))
        };
        notify(&observers, &snapshot);
        Ok(snapshot)
    }

    /// Append a goal if not already present. Returns whether it was added.
    pub fn add_goal(&self, agent_id: &str, goal: &str) -> Result<bool, KernelError> {
        let mut added = false;
        self.modify(agent_id, |state| added = state.push_goal(goal))?;
        Ok(added)
    }

    pub fn update_belief(&self, agent_id: &str, key: &str, value: &str) -> Result<(), KernelError> {
        self.modify(agent_id, |state| {
            state.beliefs.insert(key.to_string(), value.to_string());
        })
        .map(|_| ())
    }

    /// Observers may be registered before the agent itself.
    pub fn register_observer(&self, agent_id: &str, observer: Observer) {
        self.inner.write().observers.register(agent_id, observer);
    }

    pub fn unregister_observers(&self, agent_id: &str) -> usize {
        self.inner.write().observers.unregister(agent_id)
    }

    pub fn observer_count(&self, agent_id: &str) -> usize {
        self.inner.read().observers.count(agent_id)
    }
}

impl std::fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTable")
            .field("agents", &self.ids())
            .finish()
    }
}

/// Wrap a closure as an [`Observer`].
pub(crate) fn observer<F>(f: F) -> Observer
where
    F: Fn(&AgentState) + Send + Sync + 'static,
{
    Arc::new(f)
}
