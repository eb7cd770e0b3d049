use anyhow::{Context, Result};
use clap::Args;
use swarmcog_core::{AtomId, KnowledgeStore};

use crate::output::{format, OutputFormat};

#[derive(Args)]
pub struct SpaceArgs {
    /// Number of most important atoms to show
    #[arg(short = 'n', long, default_value = "5")]
    pub limit: usize,
}

pub fn run(args: &SpaceArgs, format: OutputFormat) -> Result<()> {
    let store = KnowledgeStore::new("demo_space");
    let agents = seed(&store).context("Failed to seed demo knowledge store")?;

    let mut trust = Vec::new();
    for (i, (name_a, a)) in agents.iter().enumerate() {
        for (name_b, b) in &agents[i + 1..] {
            trust.push((name_a.clone(), name_b.clone(), store.trust_level(a, b)));
        }
    }

    println!(
        "{}",
        format::format_space_report(
            &store.statistics(),
            &store.get_most_important_atoms(args.limit),
            &trust,
            format,
        )?
    );
    Ok(())
}

/// A small team: three agents, their capabilities, goals and relationships.
fn seed(store: &KnowledgeStore) -> Result<Vec<(String, AtomId)>> {
    let team = [
        ("coordinator", &["planning", "delegation"][..]),
        ("researcher", &["reasoning", "search"][..]),
        ("analyst", &["reasoning", "statistics"][..]),
    ];

    let mut agents = Vec::new();
    for (name, capabilities) in team {
        let capabilities: Vec<String> = capabilities.iter().map(|c| c.to_string()).collect();
        let agent = store.add_agent_node(name, &capabilities)?;
        for capability in &capabilities {
            let description = format!("{name} can do {capability}");
            let node = store.add_capability_node(capability, &description)?;
            store.add_knowledge_link(&agent.id, &node.id, "has_capability")?;
        }
        agents.push((agent.name, agent.id));
    }

    let (coordinator, researcher, analyst) = (&agents[0].1, &agents[1].1, &agents[2].1);
    store.add_trust_relationship(coordinator, researcher, 0.8)?;
    store.add_trust_relationship(researcher, analyst, 0.6)?;
    store.add_collaboration_link(coordinator, researcher, "research")?;
    store.add_collaboration_link(coordinator, analyst, "analysis")?;

    let goal = store.add_goal_node("publish_findings", 0.9)?;
    store.stimulate(&goal.id, 0.6, 0.3, 0.0)?;
    store.add_belief_node("data_quality", "high")?;
    let memory = store.add_memory_node("Kickoff meeting held", "episodic")?;
    store.add_to_attentional_focus(memory.id);
    store.add_to_attentional_focus(goal.id);
    store.stimulate(coordinator, 0.4, 0.0, 0.0)?;

    Ok(agents)
}
