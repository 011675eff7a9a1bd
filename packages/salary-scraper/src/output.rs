//! Reading and writing the run artifact.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::types::RunResult;

/// Write `result` as pretty-printed JSON, replacing any existing file.
pub fn write_run_result(path: &Path, result: &RunResult) -> Result<()> {
    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');
    fs::write(path, json)?;

    info!(path = %path.display(), companies = result.len(), "Wrote salary report");
    Ok(())
}

pub fn read_run_result(path: &Path) -> Result<RunResult> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
