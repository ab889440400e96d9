//! Plain-text views of an analysed log.

use agentlens_monitor::{total_duration_ms, LogAnalysis, TraceNode};

/// Agent info, run metrics and tool usage as aligned text.
pub fn summary(analysis: &LogAnalysis) -> String {
    let agent = analysis.agent_info();
    let metrics = analysis.metrics();
    let mut out = String::new();

    out.push_str(&format!("Agent:     {}\n", agent.short_id));
    out.push_str(&format!("Model:     {}\n", agent.model.as_deref().unwrap_or("N/A")));
    out.push_str(&format!("Task:      {}\n", agent.task.as_deref().unwrap_or("N/A")));
    if !agent.toolkit.is_empty() {
        out.push_str(&format!("Toolkit:   {}\n", agent.toolkit.join(", ")));
    }

    out.push('\n');
    out.push_str(&format!("Steps:            {}\n", metrics.total_steps));
    out.push_str(&format!("LLM calls:        {}\n", metrics.llm_calls));
    out.push_str(&format!("Tool executions:  {}\n", metrics.tool_executions));
    out.push_str(&format!(
        "Duration:         {:.2} s\n",
        metrics.total_duration_ms / 1000.0
    ));
    out.push_str(&format!(
        "Tokens:           {} ({} prompt / {} completion)\n",
        metrics.total_tokens, metrics.total_prompt_tokens, metrics.total_completion_tokens
    ));
    out.push_str(&format!("Avg step:         {:.0} ms\n", metrics.avg_duration_per_step));
    out.push_str(&format!("Avg tokens/call:  {:.0}\n", metrics.avg_tokens_per_llm_call));

    let usage = analysis.tool_usage();
    if !usage.is_empty() {
        out.push_str("\nTool usage:\n");
        for (tool, count) in &usage {
            out.push_str(&format!("  {:<24} {}\n", tool, count));
        }
    }
    out
}

/// Indented span tree with each span's duration and share of the root total.
pub fn tree(roots: &[TraceNode]) -> String {
    let total = total_duration_ms(roots);
    let mut out = String::new();
    for (depth, node) in roots.iter().flat_map(TraceNode::walk) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.name);
        if node.duration_ms > 0.0 {
            out.push_str(&format!(
                " [{:.0} ms, {:.1}%]",
                node.duration_ms,
                node.share_of(total)
            ));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlens_core::parse_log;

    fn analysis() -> LogAnalysis {
        let log = parse_log(r#"{
            "id": "sgr_agent_deadbeef99",
            "model_config": {"model": "gpt-4o"},
            "task": "Compare two crates",
            "toolkit": ["websearchtool"],
            "log": [
                {"step_number": 1, "step_type": "llm_call", "phase": "reasoning_phase",
                 "metrics": {"duration_ms": 750, "total_tokens": 300, "prompt_tokens": 250, "completion_tokens": 50}},
                {"step_number": 1, "step_type": "tool_execution", "tool_name": "websearchtool"},
                {"step_number": 2, "step_type": "llm_call", "phase": "action_selection",
                 "metrics": {"duration_ms": 250, "total_tokens": 100}}
            ]
        }"#)
        .unwrap();
        LogAnalysis::new(log)
    }

    #[test]
    fn test_summary() {
        let text = summary(&analysis());
        assert!(text.contains("Agent:     deadbeef"));
        assert!(text.contains("Model:     gpt-4o"));
        assert!(text.contains("LLM calls:        2"));
        assert!(text.contains("Tokens:           400 (250 prompt / 50 completion)"));
        assert!(text.contains("websearchtool"));
    }

    #[test]
    fn test_tree() {
        let text = tree(&analysis().trace());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Step 1: LLM Reasoning [750 ms, 75.0%]",
                "  websearchtool",
                "Step 2: LLM Action [250 ms, 25.0%]",
            ]
        );
    }

    #[test]
    fn test_tree_empty() {
        assert_eq!(tree(&[]), "");
    }
}
