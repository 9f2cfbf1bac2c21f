use axum::extract::{Form, Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::assistant::{self, Assistant};
use crate::data;
use crate::grid::{self, DateBucketIndex, MonthCursor};
use crate::html::{self, RenderOptions};
use crate::types::Task;

/// Application state shared across requests
pub struct AppState {
    pub tasks: RwLock<Vec<Task>>,
    pub tasks_path: PathBuf,
    pub assistant: Option<Assistant>,
    pub opts: RenderOptions,
}

/// Start the web server with task-file watching
pub async fn serve(
    port: u16,
    output_dir: PathBuf,
    opts: RenderOptions,
    assistant: Option<Assistant>,
) -> anyhow::Result<()> {
    let tasks_path = output_dir.join(data::TASKS_FILE);
    let tasks = data::load_tasks(&tasks_path)?;
    info!(count = tasks.len(), "Tasks loaded");

    let state = Arc::new(AppState {
        tasks: RwLock::new(tasks),
        tasks_path,
        assistant,
        opts,
    });

    start_file_watcher(state.clone())?;

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!(addr = %addr, "Server running");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Build the router (kept separate from `serve` so tests can drive it)
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(calendar_handler))
        .route("/api/tasks", get(tasks_handler))
        .route("/api/refresh", get(refresh_handler))
        .route("/ask_ai", post(ask_handler))
        .with_state(state)
}

/// Watch the directory holding the task file; a change to it reloads the
/// task list into state.
fn start_file_watcher(state: Arc<AppState>) -> anyhow::Result<()> {
    let watch_dir = state
        .tasks_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if !watch_dir.exists() {
        std::fs::create_dir_all(&watch_dir)?;
    }

    // Create a channel to receive events
    let (tx, mut rx) = tokio::sync::mpsc::channel(10);

    // Spawn a blocking task for the file watcher
    std::thread::spawn(move || {
        let tx_clone = tx.clone();
        let mut debouncer = new_debouncer(
            Duration::from_secs(2),
            move |result: DebounceEventResult| {
                if let Ok(events) = result {
                    let touched = events.iter().any(|e| {
                        e.path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .map(|n| n == data::TASKS_FILE)
                            .unwrap_or(false)
                    });

                    if touched {
                        let _ = tx_clone.blocking_send(());
                    }
                }
            },
        )
        .expect("Failed to create debouncer");

        debouncer
            .watcher()
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .expect("Failed to watch directory");

        // Keep the watcher alive
        loop {
            std::thread::sleep(Duration::from_secs(60));
        }
    });

    // Spawn a task to handle file change notifications
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            match data::load_tasks(&state.tasks_path) {
                Ok(new_tasks) => {
                    let mut tasks = state.tasks.write().await;
                    let old_count = tasks.len();
                    *tasks = new_tasks;
                    info!(
                        count = tasks.len(),
                        delta = tasks.len() as i64 - old_count as i64,
                        "Task list reloaded"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Failed to reload task file");
                }
            }
        }
    });

    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    year: Option<i32>,
    month: Option<u32>,
}

/// Serve the calendar page for the requested month; missing or out-of-range
/// query values fall back to the current month.
async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Html<String> {
    let today = Local::now().date_naive();

    let cursor = match (query.year, query.month) {
        (Some(year), Some(month)) => {
            MonthCursor::new(year, month).unwrap_or_else(|| MonthCursor::for_date(today))
        }
        _ => MonthCursor::for_date(today),
    };

    // The index is rebuilt per page render: "today" moves, and the task
    // list may have been reloaded since the last request.
    let tasks = state.tasks.read().await;
    let index = DateBucketIndex::build(&tasks, today);
    let view = grid::generate(cursor, &index, today);

    Html(html::render_page(&view, state.opts).into_string())
}

/// Return the task list as JSON
async fn tasks_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    let tasks = state.tasks.read().await;
    Json(tasks.clone())
}

/// Reload the task file on demand (manual trigger)
async fn refresh_handler(State(state): State<Arc<AppState>>) -> &'static str {
    info!("Manual refresh triggered");

    match data::load_tasks(&state.tasks_path) {
        Ok(new_tasks) => {
            let mut tasks = state.tasks.write().await;
            *tasks = new_tasks;
            "OK"
        }
        Err(e) => {
            warn!(error = %e, "Refresh failed");
            "ERROR"
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    prompt: String,
}

/// Relay a chat prompt to the upstream assistant endpoint.
///
/// Always answers 200 with a `response` body; failures collapse to one
/// static inline message per attempt, with no retry and no queueing.
async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AskForm>,
) -> Json<serde_json::Value> {
    let question = form.prompt.trim();
    if question.is_empty() {
        return Json(serde_json::json!({ "response": assistant::EMPTY_PROMPT_REPLY }));
    }

    let Some(assistant) = &state.assistant else {
        warn!("Assistant endpoint not configured");
        return Json(serde_json::json!({ "response": assistant::FALLBACK_REPLY }));
    };

    let prompt = {
        let tasks = state.tasks.read().await;
        assistant::build_prompt(&tasks, question)
    };

    let response = match assistant.ask(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Assistant call failed");
            assistant::FALLBACK_REPLY.to_string()
        }
    };

    Json(serde_json::json!({ "response": response }))
}
