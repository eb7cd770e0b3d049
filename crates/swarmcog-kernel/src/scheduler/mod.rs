//! Worker-pool scheduler for cognitive cycles.

mod queue;
mod stats;
mod task;
mod worker;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};
use swarmcog_core::config::default_workers;
use swarmcog_core::{AgentState, CognitivePhase, KnowledgeStore, ProcessingMode, SwarmCogConfig};

pub use stats::ProcessingStats;
pub use task::{generate_task_id, phase_priority, CognitiveTask, CycleId, TaskId};

use self::queue::TaskQueue;
use self::stats::StatsCollector;
use crate::agents::{observer, AgentTable};
use crate::error::KernelError;
use crate::phases::{CognitiveContext, PhaseHandler, PhaseRegistry};

pub(crate) struct QueueState {
    pub tasks: TaskQueue,
    pub in_flight: usize,
    pub running: bool,
}

struct Settings {
    processing_mode: ProcessingMode,
    cycle_interval: Duration,
}

/// State shared between the scheduler handle and its workers.
pub(crate) struct Shared {
    pub store: Arc<KnowledgeStore>,
    pub agents: AgentTable,
    pub phases: RwLock<PhaseRegistry>,
    pub queue: Mutex<QueueState>,
    /// Signalled on every push, completion and shutdown.
    pub wakeup: Condvar,
    pub stats: StatsCollector,
    next_cycle: AtomicU64,
    settings: RwLock<Settings>,
}

/// Owns registered agents, the phase task queue and the worker threads.
///
/// Workers are started with [`start`](Self::start) and joined by
/// [`stop`](Self::stop) or on drop. The cycle interval is only stored here;
/// callers drive their own loop with it.
pub struct Scheduler {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_workers: usize,
}

impl Scheduler {
    /// `num_workers == 0` means one worker per available core.
    pub fn new(store: Arc<KnowledgeStore>, mode: ProcessingMode, num_workers: usize) -> Self {
        let num_workers = if num_workers > 0 {
            num_workers
        } else {
            default_workers()
        };
        warn_if_degraded(mode);
        tracing::info!(workers = num_workers, %mode, "Initializing scheduler");

        Self {
            shared: Arc::new(Shared {
                store,
                agents: AgentTable::new(),
                phases: RwLock::new(PhaseRegistry::builtin()),
                queue: Mutex::new(QueueState {
                    tasks: TaskQueue::default(),
                    in_flight: 0,
                    running: false,
                }),
                wakeup: Condvar::new(),
                stats: StatsCollector::new(),
                next_cycle: AtomicU64::new(0),
                settings: RwLock::new(Settings {
                    processing_mode: mode,
                    cycle_interval: Duration::from_secs(1),
                }),
            }),
            workers: Mutex::new(Vec::new()),
            num_workers,
        }
    }

    /// Build from a validated configuration.
    pub fn from_config(
        store: Arc<KnowledgeStore>,
        config: &SwarmCogConfig,
    ) -> Result<Self, KernelError> {
        config.validate()?;
        let scheduler = Self::new(store, config.processing_mode, config.effective_workers());
        scheduler.set_cycle_interval(config.cycle_interval());
        Ok(scheduler)
    }

    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.shared.store
    }

    pub fn agents(&self) -> &AgentTable {
        &self.shared.agents
    }

    // -- agents --------------------------------------------------------------

    /// Register an agent. Re-registering returns the existing state unchanged.
    pub fn add_cognitive_agent(
        &self,
        agent_id: &str,
        goals: Vec<String>,
        beliefs: BTreeMap<String, String>,
    ) -> AgentState {
        self.shared.agents.register(agent_id, goals, beliefs)
    }

    pub fn remove_cognitive_agent(&self, agent_id: &str) -> bool {
        self.shared.agents.remove(agent_id)
    }

    pub fn has_agent(&self, agent_id: &str) -> bool {
        self.shared.agents.contains(agent_id)
    }

    /// Registered agent ids, sorted.
    pub fn get_active_agents(&self) -> Vec<String> {
        self.shared.agents.ids()
    }

    pub fn get_cognitive_state(&self, agent_id: &str) -> Result<AgentState, KernelError> {
        self.shared.agents.get(agent_id)
    }

    pub fn update_cognitive_state(
        &self,
        agent_id: &str,
        state: AgentState,
    ) -> Result<(), KernelError> {
        self.shared.agents.update(agent_id, state)
    }

    pub fn add_goal(&self, agent_id: &str, goal: &str) -> Result<bool, KernelError> {
        self.shared.agents.add_goal(agent_id, goal)
    }

    pub fn update_belief(&self, agent_id: &str, key: &str, value: &str) -> Result<(), KernelError> {
        self.shared.agents.update_belief(agent_id, key, value)
    }

    pub fn register_callback<F>(&self, agent_id: &str, callback: F)
    where
        F: Fn(&AgentState) + Send + Sync + 'static,
    {
        self.shared.agents.register_observer(agent_id, observer(callback));
    }

    pub fn unregister_callbacks(&self, agent_id: &str) {
        self.shared.agents.unregister_observers(agent_id);
    }

    /// Replace the handler for one phase. Returns the previous handler.
    pub fn register_phase_handler(&self, handler: Arc<dyn PhaseHandler>) -> Arc<dyn PhaseHandler> {
        let phase = handler.phase();
        let previous = self.shared.phases.write().register(handler);
        tracing::info!(%phase, "Registered phase handler");
        previous
    }

    // -- lifecycle -----------------------------------------------------------

    /// Spawn the worker pool. A no-op if already running.
    pub fn start(&self) -> Result<(), KernelError> {
        let mut workers = self.workers.lock();
        {
            let mut queue = self.shared.queue.lock();
            if queue.running {
                tracing::warn!("Scheduler already running");
                return Ok(());
            }
            queue.running = true;
        }
        self.shared.stats.mark_started();

        for worker_id in 0..self.num_workers {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("swarmcog-worker-{worker_id}"))
                .spawn(move || worker::worker_loop(worker_id, shared));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    drop(workers);
                    self.stop();
                    return Err(KernelError::WorkerSpawn(err));
                }
            }
        }

        tracing::info!(workers = self.num_workers, "Scheduler started");
        Ok(())
    }

    /// Stop accepting dequeues and join every worker. Tasks already picked
    /// up run to completion; queued tasks stay queued. A no-op if stopped.
    pub fn stop(&self) {
        let mut workers = self.workers.lock();
        {
            let mut queue = self.shared.queue.lock();
            if !queue.running && workers.is_empty() {
                return;
            }
            queue.running = false;
        }
        self.shared.wakeup.notify_all();

        for handle in workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
        tracing::info!("Scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.queue.lock().running
    }

    pub fn worker_count(&self) -> usize {
        self.num_workers
    }

    // -- scheduling ----------------------------------------------------------

    /// Enqueue a single ad-hoc task. It is not sequenced against any cycle.
    pub fn schedule_task(&self, task: CognitiveTask) -> TaskId {
        let id = task.id.clone();
        tracing::debug!(task = %id, agent = %task.agent_id, phase = %task.phase, "Scheduled task");
        self.shared.queue.lock().tasks.push(task);
        self.shared.wakeup.notify_all();
        id
    }

    pub fn schedule_cognitive_phase(
        &self,
        agent_id: &str,
        phase: CognitivePhase,
        parameters: BTreeMap<String, String>,
    ) -> Result<TaskId, KernelError> {
        if !self.has_agent(agent_id) {
            return Err(KernelError::agent_not_found(agent_id));
        }
        Ok(self.schedule_task(CognitiveTask::new(agent_id, phase).with_parameters(parameters)))
    }

    /// Enqueue the seven phases of one cycle for `agent_id`.
    ///
    /// Returns as soon as the tasks are queued. Phase outcomes show up only
    /// in [`get_processing_stats`](Self::get_processing_stats) and observers.
    pub fn run_cognitive_cycle(&self, agent_id: &str) -> Result<CycleId, KernelError> {
        if !self.has_agent(agent_id) {
            tracing::warn!(agent = agent_id, "Cannot run cognitive cycle for unknown agent");
            return Err(KernelError::agent_not_found(agent_id));
        }

        let cycle_id = self.shared.next_cycle.fetch_add(1, Ordering::Relaxed) + 1;
        let tasks = CognitivePhase::ALL
            .iter()
            .map(|phase| CognitiveTask::new(agent_id, *phase).in_cycle(cycle_id))
            .collect();
        let context = CognitiveContext::for_cycle(agent_id, cycle_id);

        self.shared
            .queue
            .lock()
            .tasks
            .push_cycle(cycle_id, context, tasks);
        self.shared.stats.record_cycle();
        self.shared.wakeup.notify_all();

        tracing::debug!(agent = agent_id, cycle = cycle_id, "Scheduled cognitive cycle");
        Ok(cycle_id)
    }

    /// One cycle for every registered agent. Agents removed concurrently are skipped.
    pub fn run_all_agents_cycles(&self) -> Vec<CycleId> {
        self.get_active_agents()
            .iter()
            .filter_map(|agent_id| self.run_cognitive_cycle(agent_id).ok())
            .collect()
    }

    /// Block until nothing is queued or running, or the timeout passes.
    /// Returns whether the scheduler went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut queue = self.shared.queue.lock();
        loop {
            if queue.tasks.is_empty() && queue.in_flight == 0 {
                return true;
            }
            if !queue.running && queue.in_flight == 0 {
                return false;
            }
            if self
                .shared
                .wakeup
                .wait_until(&mut queue, deadline)
                .timed_out()
            {
                return queue.tasks.is_empty() && queue.in_flight == 0;
            }
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.shared.queue.lock().tasks.len()
    }

    // -- statistics ----------------------------------------------------------

    pub fn get_processing_stats(&self) -> ProcessingStats {
        self.shared.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.shared.stats.reset();
    }

    /// Diagnostic key/value snapshot.
    pub fn get_system_status(&self) -> BTreeMap<String, String> {
        let stats = self.get_processing_stats();
        let (running, queued, in_flight) = {
            let queue = self.shared.queue.lock();
            (queue.running, queue.tasks.len(), queue.in_flight)
        };
        let settings = self.shared.settings.read();

        let mut status = BTreeMap::new();
        status.insert("running".to_string(), running.to_string());
        status.insert("num_workers".to_string(), self.num_workers.to_string());
        status.insert(
            "processing_mode".to_string(),
            settings.processing_mode.to_string(),
        );
        status.insert(
            "cycle_interval".to_string(),
            settings.cycle_interval.as_secs_f64().to_string(),
        );
        status.insert("total_cycles".to_string(), stats.total_cycles.to_string());
        status.insert(
            "completed_tasks".to_string(),
            stats.completed_tasks.to_string(),
        );
        status.insert("failed_tasks".to_string(), stats.failed_tasks.to_string());
        status.insert(
            "active_agents".to_string(),
            self.shared.agents.len().to_string(),
        );
        status.insert("queued_tasks".to_string(), queued.to_string());
        status.insert("in_flight_tasks".to_string(), in_flight.to_string());
        status
    }

    // -- settings ------------------------------------------------------------

    pub fn processing_mode(&self) -> ProcessingMode {
        self.shared.settings.read().processing_mode
    }

    /// Every mode runs on the worker pool; non-native modes are logged as such.
    pub fn set_processing_mode(&self, mode: ProcessingMode) {
        warn_if_degraded(mode);
        self.shared.settings.write().processing_mode = mode;
        tracing::info!(%mode, "Processing mode changed");
    }

    pub fn cycle_interval(&self) -> Duration {
        self.shared.settings.read().cycle_interval
    }

    pub fn set_cycle_interval(&self, interval: Duration) {
        self.shared.settings.write().cycle_interval = interval;
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("workers", &self.num_workers)
            .field("running", &self.is_running())
            .field("agents", &self.shared.agents.len())
            .finish()
    }
}

fn warn_if_degraded(mode: ProcessingMode) {
    if !mode.is_native() {
        tracing::warn!(
            %mode,
            "Processing mode not implemented, falling back to asynchronous worker pool"
        );
    }
}
