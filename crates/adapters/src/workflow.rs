// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning a job's workflow payload into the step list a task starts with.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid workflow payload: {0}")]
    Payload(String),
    #[error("invalid cron spec {spec:?}: {reason}")]
    Cron { spec: String, reason: String },
}

/// Extracts step names from an opaque job payload. Synchronous: parsing is
/// CPU-bound and runs outside any store transaction.
pub trait WorkflowParser: Send + Sync + 'static {
    fn parse_steps(&self, payload: &str) -> Result<Vec<String>, ParseError>;
}

#[derive(Debug, Deserialize)]
struct PayloadDoc {
    #[serde(default)]
    steps: Vec<StepDoc>,
}

#[derive(Debug, Deserialize)]
struct StepDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    run: Option<String>,
    #[serde(default)]
    uses: Option<String>,
}

impl StepDoc {
    fn display_name(&self, index: usize) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        if let Some(uses) = self.uses.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return uses.to_string();
        }
        if let Some(line) = self.run.as_deref().and_then(|r| r.lines().map(str::trim).find(|l| !l.is_empty())) {
            return format!("Run {line}");
        }
        format!("Step {}", index + 1)
    }
}

/// Parser for JSON payloads of the form
/// `{"steps": [{"name": "...", "run": "...", "uses": "..."}]}`.
///
/// Unnamed steps are named after their action (`uses`), else the first line
/// of their script (`Run <line>`). An empty payload has no steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonWorkflowParser;

impl WorkflowParser for JsonWorkflowParser {
    fn parse_steps(&self, payload: &str) -> Result<Vec<String>, ParseError> {
        if payload.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: PayloadDoc =
            serde_json::from_str(payload).map_err(|e| ParseError::Payload(e.to_string()))?;
        Ok(doc.steps.iter().enumerate().map(|(i, s)| s.display_name(i)).collect())
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
