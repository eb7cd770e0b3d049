use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use swarmcog_core::{KnowledgeStore, SwarmCogConfig};
use swarmcog_kernel::Scheduler;

use crate::output::{format, OutputFormat};

/// How long to wait for queued phases to drain after the last round.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_GOAL: &str = "explore_environment";

#[derive(Args)]
pub struct RunArgs {
    /// Number of agents to register (agent_1 .. agent_N)
    #[arg(short = 'n', long, default_value = "3")]
    pub agents: usize,

    /// Rounds of cycles; each round runs one cycle per agent
    #[arg(short, long, default_value = "1")]
    pub cycles: usize,

    /// Worker threads (defaults to the config value, then available cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Goal given to every agent (repeatable)
    #[arg(short, long = "goal")]
    pub goals: Vec<String>,

    /// JSON config file
    #[arg(long, env = "SWARMCOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds to sleep between rounds (overrides the config)
    #[arg(long)]
    pub interval: Option<f64>,
}

/// `log_level` from the config file, if one is given and readable. Load
/// errors are reported later by [`run`].
pub fn configured_log_level(args: &RunArgs) -> Option<String> {
    let path = args.config.as_ref()?;
    SwarmCogConfig::load(path).ok().map(|config| config.log_level)
}

pub fn run(args: &RunArgs, format: OutputFormat) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SwarmCogConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SwarmCogConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.worker_count = Some(workers);
    }
    if let Some(interval) = args.interval {
        config.cycle_interval_secs = interval;
    }
    config.validate().context("Invalid configuration")?;

    if args.agents == 0 {
        bail!("At least one agent is required");
    }
    if args.agents > config.max_agents {
        bail!(
            "Refusing to register {} agents (max_agents is {})",
            args.agents,
            config.max_agents
        );
    }

    let goals = if args.goals.is_empty() {
        vec![DEFAULT_GOAL.to_string()]
    } else {
        args.goals.clone()
    };

    let store = Arc::new(KnowledgeStore::new(config.space_name.clone()));
    let scheduler = Scheduler::from_config(Arc::clone(&store), &config)
        .context("Failed to create scheduler")?;

    for i in 1..=args.agents {
        let agent_id = format!("agent_{i}");
        store
            .add_agent_node(&agent_id, &["reasoning".to_string(), "planning".to_string()])
            .with_context(|| format!("Failed to add agent node for {agent_id}"))?;
        for goal in &goals {
            store.add_goal_node(goal, 0.5)?;
        }
        scheduler.add_cognitive_agent(&agent_id, goals.clone(), BTreeMap::new());
    }

    scheduler.start().context("Failed to start worker pool")?;
    for round in 0..args.cycles {
        let scheduled = scheduler.run_all_agents_cycles();
        tracing::info!(round, cycles = scheduled.len(), "Scheduled round");
        if round + 1 < args.cycles {
            std::thread::sleep(scheduler.cycle_interval());
        }
    }
    if !scheduler.wait_idle(DRAIN_TIMEOUT) {
        bail!(
            "Timed out waiting for {} queued tasks to finish",
            scheduler.pending_tasks()
        );
    }
    scheduler.stop();

    let agents = scheduler
        .get_active_agents()
        .iter()
        .map(|id| scheduler.get_cognitive_state(id))
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "{}",
        format::format_run_report(
            &scheduler.get_processing_stats(),
            &scheduler.get_system_status(),
            &agents,
            &store.statistics(),
            format,
        )?
    );
    Ok(())
}
