//! Priority queue of phase tasks with per-cycle sequencing.
//!
//! Tasks are ordered by `(priority desc, enqueue seq asc)`. A task that
//! belongs to a cycle is only eligible once every earlier step of that cycle
//! has finished, so a cycle's phases never overlap even when several workers
//! are idle. Ad-hoc tasks are always eligible.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use super::task::{CognitiveTask, CycleId, CycleTicket};
use crate::phases::CognitiveContext;

type QueueKey = (Reverse<i32>, u64);

struct CycleProgress {
    next_step: usize,
    steps: usize,
    /// Parked here between steps; `None` while a step is running.
    context: Option<CognitiveContext>,
}

/// A task handed to a worker together with the context it runs against.
pub(crate) struct Dispatch {
    pub task: CognitiveTask,
    pub context: CognitiveContext,
}

#[derive(Default)]
pub(crate) struct TaskQueue {
    tasks: BTreeMap<QueueKey, CognitiveTask>,
    cycles: HashMap<CycleId, CycleProgress>,
    next_seq: u64,
}

impl TaskQueue {
    pub fn push(&mut self, task: CognitiveTask) {
        self.next_seq += 1;
        self.tasks.insert((Reverse(task.priority), self.next_seq), task);
    }

    /// Enqueue all steps of a cycle. `tasks` must be in step order.
    pub fn push_cycle(
        &mut self,
        cycle_id: CycleId,
        context: CognitiveContext,
        tasks: Vec<CognitiveTask>,
    ) {
        self.cycles.insert(
            cycle_id,
            CycleProgress {
                next_step: 0,
                steps: tasks.len(),
                context: Some(context),
            },
        );
        for task in tasks {
            self.push(task);
        }
    }

    /// Remove and return the highest-priority eligible task.
    pub fn pop_ready(&mut self) -> Option<Dispatch> {
        let key = self
            .tasks
            .iter()
            .find(|(_, task)| self.is_eligible(task))
            .map(|(key, _)| *key)?;
        let task = self.tasks.remove(&key)?;

        let context = match task.ticket {
            Some(ticket) => self
                .cycles
                .get_mut(&ticket.cycle_id)
                .and_then(|progress| progress.context.take())
                .unwrap_or_else(|| {
                    CognitiveContext::for_cycle(task.agent_id.clone(), ticket.cycle_id)
                }),
            None => CognitiveContext::new(task.agent_id.clone())
                .with_variables(task.parameters.clone()),
        };
        Some(Dispatch { task, context })
    }

    /// Record that a dispatched task finished, successfully or not, and
    /// release the next step of its cycle.
    pub fn complete(&mut self, ticket: Option<CycleTicket>, context: CognitiveContext) {
        let Some(ticket) = ticket else { return };
        let Some(progress) = self.cycles.get_mut(&ticket.cycle_id) else {
            return;
        };
        progress.next_step = ticket.step + 1;
        if progress.next_step >= progress.steps {
            self.cycles.remove(&ticket.cycle_id);
        } else {
            progress.context = Some(context);
        }
    }

    fn is_eligible(&self, task: &CognitiveTask) -> bool {
        match task.ticket {
            None => true,
            Some(ticket) => self
                .cycles
                .get(&ticket.cycle_id)
                .is_some_and(|p| p.next_step == ticket.step && p.context.is_some()),
        }
    }

    pub fn has_ready(&self) -> bool {
        self.tasks.values().any(|task| self.is_eligible(task))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn open_cycles(&self) -> usize {
        self.cycles.len()
    }
}
