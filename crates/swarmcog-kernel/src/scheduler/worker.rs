//! Worker loop: wait for an eligible task, run its phase handler, record
//! the outcome, release the next step of its cycle.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use super::queue::Dispatch;
use super::Shared;
use crate::agents::panic_message;
use crate::error::KernelError;
use crate::phases;

pub(crate) fn worker_loop(worker_id: usize, shared: Arc<Shared>) {
    tracing::debug!(worker = worker_id, "Worker started");
    loop {
        let dispatch = {
            let mut queue = shared.queue.lock();
            loop {
                if !queue.running {
                    tracing::debug!(worker = worker_id, "Worker stopping");
                    return;
                }
                if let Some(dispatch) = queue.tasks.pop_ready() {
                    queue.in_flight += 1;
                    break dispatch;
                }
                shared.wakeup.wait(&mut queue);
            }
        };

        let Dispatch { task, mut context } = dispatch;
        let ticket = task.ticket;
        let started = Instant::now();
        let outcome = run_task(&shared, &task, &mut context);
        let elapsed = started.elapsed();
        context.variables.insert(
            format!("{}_time_us", task.phase),
            elapsed.as_micros().to_string(),
        );

        match &outcome {
            Ok(()) => {
                tracing::debug!(
                    worker = worker_id,
                    task = %task.id,
                    agent = %task.agent_id,
                    phase = %task.phase,
                    ?elapsed,
                    "Task completed"
                );
            }
            Err(err) => {
                tracing::error!(
                    worker = worker_id,
                    agent = %task.agent_id,
                    phase = %task.phase,
                    "{err}"
                );
            }
        }
        shared.stats.record_task(outcome.is_ok(), elapsed);

        {
            let mut queue = shared.queue.lock();
            queue.tasks.complete(ticket, context);
            queue.in_flight -= 1;
        }
        shared.wakeup.notify_all();
    }
}

/// Run one task. Handler errors and panics both come back as `TaskFailed`.
fn run_task(
    shared: &Shared,
    task: &super::CognitiveTask,
    context: &mut phases::CognitiveContext,
) -> Result<(), KernelError> {
    let handler = shared.phases.read().get(task.phase);
    let result = catch_unwind(AssertUnwindSafe(|| {
        phases::execute(
            handler.as_ref(),
            &shared.agents,
            &shared.store,
            &task.agent_id,
            context,
        )
    }));

    let reason = match result {
        Ok(Ok(_)) => return Ok(()),
        Ok(Err(err)) => err.to_string(),
        Err(payload) => format!("handler panicked: {}", panic_message(payload.as_ref())),
    };
    Err(KernelError::TaskFailed {
        task_id: task.id.clone(),
        reason,
    })
}
