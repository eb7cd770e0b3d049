use swarmcog_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Agent not found: {agent_id}")]
    AgentNotFound { agent_id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(std::io::Error),
}

impl KernelError {
    pub(crate) fn agent_not_found(agent_id: &str) -> Self {
        KernelError::AgentNotFound {
            agent_id: agent_id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            KernelError::AgentNotFound { .. } => true,
            KernelError::Core(err) => err.is_not_found(),
            _ => false,
        }
    }
}
