//! Timed detection scripts for replaying a capture session
//!
//! One JSON object per line: `{"at_ms": 0, "event": {"type": "no_face"}}`.
//! Blank lines and lines starting with `#` are skipped.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::error::ScriptError;
use crate::types::DetectionEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Offset from the start of the replay
    pub at_ms: u64,
    pub event: DetectionEvent,
}

impl ScriptStep {
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

/// Parse a script; offsets must never decrease
pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps: Vec<ScriptStep> = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: ScriptStep = serde_json::from_str(line)
            .map_err(|source| ScriptError::Parse { line: i + 1, source })?;
        if steps.last().is_some_and(|prev| step.at_ms < prev.at_ms) {
            return Err(ScriptError::OutOfOrder {
                line: i + 1,
                at_ms: step.at_ms,
            });
        }
        steps.push(step);
    }
    Ok(steps)
}
