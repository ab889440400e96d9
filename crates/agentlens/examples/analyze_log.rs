//! Analyse a log file and print its slowest LLM calls.
//!
//! Run with: cargo run --example analyze_log -- path/to/agent_log.json

use agentlens::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: analyze_log <agent_log.json>")?;

    let analysis = LogAnalysis::new(load_log_file(&path)?);
    let metrics = analysis.metrics();
    println!(
        "{} steps, {} LLM calls, {} tokens",
        metrics.total_steps, metrics.llm_calls, metrics.total_tokens
    );

    let mut calls = analysis.steps_by_type(&StepType::LlmCall);
    calls.sort_by(|a, b| b.duration_ms().total_cmp(&a.duration_ms()));
    for step in calls.iter().take(3) {
        let number = step.step_number.map_or_else(|| "?".to_string(), |n| n.to_string());
        println!(
            "  step {:>3}  {:>8.0} ms  {}",
            number,
            step.duration_ms(),
            step.phase.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
