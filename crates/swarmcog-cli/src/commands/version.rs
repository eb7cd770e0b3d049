use anyhow::Result;

pub fn run() -> Result<()> {
    println!("swarmcog {}", env!("CARGO_PKG_VERSION"));
    println!(
        "cognitive phases: {}",
        swarmcog_core::CognitivePhase::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    Ok(())
}
