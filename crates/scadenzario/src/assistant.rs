//! Relay to the external AI completion endpoint.
//!
//! The endpoint is an external collaborator: we POST a single url-encoded
//! `prompt` field and expect a JSON body with a `response` string. One shot
//! per question — no retry, no queueing, and concurrent calls are
//! independent requests that may complete in any order.

use anyhow::Context as _;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::types::Task;

/// Environment variable naming the upstream completion endpoint.
pub const ENDPOINT_VAR: &str = "ASSISTANT_URL";

/// Reply shown when the upstream call fails for any reason.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request at the moment.";

/// Reply for a blank prompt.
pub const EMPTY_PROMPT_REPLY: &str = "No prompt provided.";

/// Tasks included as context in the upstream prompt.
const CONTEXT_TASKS: usize = 10;

#[derive(Debug, Error)]
pub enum AskError {
    /// Transport failure or non-success status from the endpoint.
    #[error("assistant request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered, but not with the expected JSON shape.
    #[error("assistant reply was not in the expected shape: {0}")]
    Malformed(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct AskReply {
    response: String,
}

/// Client for the hosted AI prompt endpoint.
#[derive(Debug, Clone)]
pub struct Assistant {
    endpoint: String,
    client: reqwest::Client,
}

impl Assistant {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build an assistant from `ASSISTANT_URL`.
    ///
    /// Reads a `.env` file if one is present, then the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let endpoint = std::env::var(ENDPOINT_VAR)
            .with_context(|| format!("{ENDPOINT_VAR} environment variable not set"))?;

        Ok(Self::new(endpoint))
    }

    /// Send one prompt upstream and return the reply text.
    pub async fn ask(&self, prompt: &str) -> Result<String, AskError> {
        debug!(chars = prompt.len(), "Sending prompt to assistant endpoint");

        let reply: AskReply = self
            .client
            .post(&self.endpoint)
            .form(&[("prompt", prompt)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(AskError::Malformed)?;

        Ok(reply.response)
    }
}

/// Assemble the upstream prompt: a pruned task context plus the question.
///
/// Only the first [`CONTEXT_TASKS`] tasks and their essential fields are
/// included to keep the token footprint down.
pub fn build_prompt(tasks: &[Task], question: &str) -> String {
    let mut context = String::new();
    if tasks.is_empty() {
        context.push_str("No tasks found.");
    } else {
        context.push_str("Current Tasks:\n");
        for task in tasks.iter().take(CONTEXT_TASKS) {
            context.push_str(&format!(
                "- {} (Due: {}, Status: {})\n",
                task.subject, task.due_date, task.status
            ));
        }
    }

    format!(
        "System: You are a concise study assistant. Answer in under 150 words.\n{context}\nUser Question: {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(n: usize) -> Task {
        Task::new(
            format!("{n}"),
            format!("Task {n}"),
            "2024-06-10".to_string(),
            "Medium".to_string(),
            "Pending".to_string(),
        )
    }

    #[test]
    fn test_build_prompt_includes_question_and_context() {
        let tasks = vec![make_task(1)];
        let prompt = build_prompt(&tasks, "What is due next?");

        assert!(prompt.contains("concise study assistant"));
        assert!(prompt.contains("- Task 1 (Due: 2024-06-10, Status: Pending)"));
        assert!(prompt.contains("User Question: What is due next?"));
    }

    #[test]
    fn test_build_prompt_without_tasks() {
        let prompt = build_prompt(&[], "Anything due?");
        assert!(prompt.contains("No tasks found."));
    }

    #[test]
    fn test_build_prompt_prunes_to_ten_tasks() {
        let tasks: Vec<Task> = (1..=15).map(make_task).collect();
        let prompt = build_prompt(&tasks, "Summarize");

        assert_eq!(prompt.matches("- Task ").count(), 10);
        assert!(prompt.contains("- Task 10 "));
        assert!(!prompt.contains("- Task 11 "));
    }

    #[test]
    fn test_reply_deserialization() {
        let reply: AskReply = serde_json::from_str(r#"{"response":"Focus on the report."}"#).unwrap();
        assert_eq!(reply.response, "Focus on the report.");
    }
}
