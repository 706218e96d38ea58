use serde::{Deserialize, Serialize};

/// Research prompt. Variables: `{company}`, `{year}`.
pub const DEFAULT_RESEARCH_PROMPT: &str = "Conduct a deep forensic audit of {company} for {year}.
1. Identify the single biggest Operational or Financial bottleneck (must be >$100M impact).
2. Provide real 2024-2025 financial data points related to this bottleneck.
3. Find specific technical debt or legacy system issues causing this.
Output purely factual data.";

/// Strategy prompt. Variables: `{company}`, `{research}`, `{year}`.
///
/// The JSON skeleton is literal text: brace groups that are not identifiers
/// pass through prompt rendering untouched.
pub const DEFAULT_STRATEGY_PROMPT: &str = r#"You are a Senior Partner at a top-tier strategy consultancy in {year}.
Based on this research for {company}: {research}

Write a Strategic Memo strictly in this JSON format:
{
  "title": "The Strategic Theme",
  "executive_summary": "300 word punchy summary for the CEO.",
  "problem_statement": "Deep dive into the $100M pain point. Use numbers.",
  "solution_architecture": "Technical description of the Multi-Agent AI System to fix it.",
  "roi_analysis": "Conservative financial projection of savings/growth.",
  "implementation_plan": "Phase 1 (Month 1-2), Phase 2 (Month 3-4), Phase 3 (Month 5-6).",
  "financials": [{"label": "2024", "value": 14.8}]
}
The "financials" list is optional: include it only with real yearly figures in billions of dollars.
Reply with the JSON object only."#;

/// Prompt templates for the two model calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub research: String,
    pub strategy: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            research: DEFAULT_RESEARCH_PROMPT.to_string(),
            strategy: DEFAULT_STRATEGY_PROMPT.to_string(),
        }
    }
}
