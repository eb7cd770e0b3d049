use std::collections::BTreeMap;

use anyhow::Result;
use swarmcog_core::{AgentState, Atom};
use swarmcog_kernel::ProcessingStats;

use super::OutputFormat;

pub fn format_run_report(
    stats: &ProcessingStats,
    status: &BTreeMap<String, String>,
    agents: &[AgentState],
    store: &BTreeMap<String, usize>,
    fmt: OutputFormat,
) -> Result<String> {
    match fmt {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "stats": {
                    "total_cycles": stats.total_cycles,
                    "completed_tasks": stats.completed_tasks,
                    "failed_tasks": stats.failed_tasks,
                    "total_processing_time_ms": stats.total_processing_time.as_secs_f64() * 1000.0,
                    "start_time": stats.start_time,
                },
                "status": status,
                "agents": agents,
                "store": store,
            });
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Text => Ok(format_run_report_text(stats, status, agents, store)),
    }
}

fn format_run_report_text(
    stats: &ProcessingStats,
    status: &BTreeMap<String, String>,
    agents: &[AgentState],
    store: &BTreeMap<String, usize>,
) -> String {
    let mut out = String::new();
    out.push_str("SwarmCog Run\n");
    out.push_str("============\n");
    out.push_str(&format!("Total cycles:     {}\n", stats.total_cycles));
    out.push_str(&format!("Completed tasks:  {}\n", stats.completed_tasks));
    out.push_str(&format!("Failed tasks:     {}\n", stats.failed_tasks));
    out.push_str(&format!(
        "Processing time:  {:.3}ms\n",
        stats.total_processing_time.as_secs_f64() * 1000.0
    ));
    if let Some(avg) = stats.average_task_time() {
        out.push_str(&format!(
            "Avg task time:    {:.3}ms\n",
            avg.as_secs_f64() * 1000.0
        ));
    }
    out.push_str(&format!(
        "Started:          {}\n",
        stats.start_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push('\n');

    out.push_str("Agents:\n");
    for agent in agents {
        out.push_str(&format!(
            "  {}: phase={} goals={} intentions={}\n",
            agent.agent_id,
            agent.current_phase,
            agent.goals.len(),
            agent.intentions.join(",")
        ));
    }
    out.push('\n');

    out.push_str("Knowledge Store:\n");
    for (key, count) in store {
        out.push_str(&format!("  {key}: {count}\n"));
    }
    out.push('\n');

    out.push_str("System Status:\n");
    for (key, value) in status {
        out.push_str(&format!("  {key}: {value}\n"));
    }
    out.trim_end().to_string()
}

pub fn format_space_report(
    stats: &BTreeMap<String, usize>,
    important: &[Atom],
    trust: &[(String, String, Option<f64>)],
    fmt: OutputFormat,
) -> Result<String> {
    match fmt {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "statistics": stats,
                "most_important": important,
                "trust": trust.iter().map(|(a, b, level)| {
                    serde_json::json!({ "from": a, "to": b, "level": level })
                }).collect::<Vec<_>>(),
            });
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Text => Ok(format_space_report_text(stats, important, trust)),
    }
}

fn format_space_report_text(
    stats: &BTreeMap<String, usize>,
    important: &[Atom],
    trust: &[(String, String, Option<f64>)],
) -> String {
    let mut out = String::new();
    out.push_str("Knowledge Store\n");
    out.push_str("===============\n");
    for (key, count) in stats {
        out.push_str(&format!("{key}: {count}\n"));
    }
    out.push('\n');

    out.push_str("Most important atoms:\n");
    for atom in important {
        out.push_str(&format!(
            "  \u{25c6} {} {} [{}] importance={:.3}\n",
            atom.id.short(),
            atom.name,
            atom.atom_type,
            atom.attention.importance()
        ));
    }
    out.push('\n');

    out.push_str("Trust:\n");
    for (a, b, level) in trust {
        let level = level
            .map(|l| format!("{l:.2}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("  {a} <-> {b}: {level}\n"));
    }
    out.trim_end().to_string()
}
