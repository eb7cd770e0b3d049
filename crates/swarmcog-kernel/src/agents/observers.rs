use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use swarmcog_core::{AgentId, AgentState};

/// Callback invoked with the new state after every successful update of an agent.
pub type Observer = Arc<dyn Fn(&AgentState) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    by_agent: HashMap<AgentId, Vec<Observer>>,
}

impl ObserverRegistry {
    pub fn register(&mut self, agent_id: &str, observer: Observer) {
        self.by_agent
            .entry(agent_id.to_string())
            .or_default()
            .push(observer);
    }

    pub fn unregister(&mut self, agent_id: &str) -> usize {
        self.by_agent.remove(agent_id).map_or(0, |list| list.len())
    }

    /// Observers for one agent, cloned so they can run without the table lock.
    pub fn for_agent(&self, agent_id: &str) -> Vec<Observer> {
        self.by_agent.get(agent_id).cloned().unwrap_or_default()
    }

    pub fn count(&self, agent_id: &str) -> usize {
        self.by_agent.get(agent_id).map_or(0, Vec::len)
    }
}

/// Run every observer in order. A panicking observer is logged and skipped.
pub(crate) fn notify(observers: &[Observer], state: &AgentState) {
    for (position, observer) in observers.iter().enumerate() {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer(state))) {
            tracing::error!(
                agent = %state.agent_id,
                observer = position,
                "Observer panicked: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
