//! The structured strategy memo and its strict JSON parsing.

use brief_chart::DataPoint;
use brief_core::{BriefError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// The Architect's structured narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMemo {
    #[serde(deserialize_with = "text_or_lines")]
    pub title: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub executive_summary: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub problem_statement: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub solution_architecture: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub roi_analysis: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub implementation_plan: String,
    /// Yearly figures for the financial chart. Invalid figures are dropped
    /// rather than failing the memo.
    #[serde(default, deserialize_with = "valid_financials", skip_serializing_if = "Option::is_none")]
    pub financials: Option<Vec<DataPoint>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrLines {
    Text(String),
    Lines(Vec<String>),
}

fn text_or_lines<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match TextOrLines::deserialize(deserializer)? {
        TextOrLines::Text(text) => text,
        TextOrLines::Lines(lines) => lines.join("\n"),
    })
}

fn valid_financials<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Vec<DataPoint>>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let points = match serde_json::from_value::<Vec<DataPoint>>(value) {
        Ok(points) => points,
        Err(e) => {
            brief_telemetry::warn!(error = %e, "ignoring malformed memo financials");
            return Ok(None);
        }
    };
    if points.is_empty() || !points.iter().all(DataPoint::is_plottable) {
        brief_telemetry::warn!(points = points.len(), "ignoring empty or out-of-range memo financials");
        return Ok(None);
    }
    Ok(Some(points))
}

/// Memo sections in reading order: key, heading and text.
pub struct Section<'a> {
    pub key: &'static str,
    pub heading: &'static str,
    pub text: &'a str,
}

impl StrategyMemo {
    /// The memo used when the strategy call fails or its reply cannot be parsed.
    pub fn fallback(company: &str) -> Self {
        let na = || "N/A".to_string();
        Self {
            title: format!("AI Transformation Strategy for {company}"),
            executive_summary: "Analysis failed. Please retry.".to_string(),
            problem_statement: na(),
            solution_architecture: na(),
            roi_analysis: na(),
            implementation_plan: na(),
            financials: None,
        }
    }

    pub fn sections(&self) -> [Section<'_>; 5] {
        [
            Section { key: "executive_summary", heading: "Executive Summary", text: &self.executive_summary },
            Section { key: "problem_statement", heading: "The Strategic Bottleneck", text: &self.problem_statement },
            Section {
                key: "solution_architecture",
                heading: "Proposed AI Architecture",
                text: &self.solution_architecture,
            },
            Section { key: "roi_analysis", heading: "ROI Analysis", text: &self.roi_analysis },
            Section { key: "implementation_plan", heading: "Implementation Plan", text: &self.implementation_plan },
        ]
    }
}

/// Drops Markdown code fences around a model reply.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```JSON", "").replace("```", "")
}

/// Extracts and parses the memo from a model reply.
///
/// Code fences are removed and the first JSON object in the reply is
/// parsed. A missing required section is an error. The reply is never
/// evaluated as code.
pub fn parse_memo(text: &str) -> Result<StrategyMemo> {
    let cleaned = strip_code_fences(text);
    let Some(start) = cleaned.find('{') else {
        return Err(BriefError::Agent("strategy reply contains no JSON object".to_string()));
    };

    // The first complete value wins; anything the model wrote after it is ignored.
    let value = serde_json::Deserializer::from_str(&cleaned[start..])
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or_else(|| BriefError::Agent("strategy reply contains no JSON object".to_string()))?
        .map_err(|e| BriefError::Agent(format!("strategy reply is not valid JSON: {e}")))?;

    serde_json::from_value(value).map_err(|e| BriefError::Agent(format!("strategy reply is not a valid memo: {e}")))
}
