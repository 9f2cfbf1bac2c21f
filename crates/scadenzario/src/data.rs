use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::types::Task;

/// Name of the task file inside the output directory.
pub const TASKS_FILE: &str = "tasks.json";

/// Load the task list from a JSON file.
///
/// A missing file is an empty list (the store has not produced one yet);
/// unreadable or malformed JSON is an error. File order is preserved — it
/// is also the display order inside a day's bucket.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    if !path.exists() {
        warn!(path = %path.display(), "No task file found, starting empty");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file: {}", path.display()))?;
    let tasks: Vec<Task> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse task file: {}", path.display()))?;

    debug!(count = tasks.len(), "Loaded tasks");
    Ok(tasks)
}
