use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod assistant;
mod data;
mod grid;
mod html;
mod server;
mod types;

#[derive(Parser, Debug)]
#[command(name = "scadenzario")]
#[command(about = "Plot a task list on a month calendar web view")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the task file and generated output
    #[arg(short, long, default_value = ".", global = true)]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Task indicators shown per calendar cell before the "+N more" summary
    #[arg(long, default_value = "4", global = true)]
    max_visible: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Render the current month as static HTML (no server)
    Build,

    /// Load a task file and list its contents
    Parse {
        /// Path to the tasks JSON file
        file: PathBuf,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level))
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("tower_http=warn".parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let opts = html::RenderOptions {
        max_visible: args.max_visible,
    };

    match args.command {
        // Default to serve if no command specified
        None => run_serve(8080, args.output, opts).await?,
        Some(Commands::Serve { port }) => run_serve(port, args.output, opts).await?,
        Some(Commands::Build) => {
            let tasks = data::load_tasks(&args.output.join(data::TASKS_FILE))?;
            let today = Local::now().date_naive();
            let index = grid::DateBucketIndex::build(&tasks, today);
            let view = grid::generate(grid::MonthCursor::for_date(today), &index, today);

            let html_path = args.output.join("calendar.html");
            html::generate_html(&view, opts, &html_path)?;
            info!(path = %html_path.display(), "HTML saved");
        }
        Some(Commands::Parse { file }) => {
            let tasks = data::load_tasks(&file)?;
            info!(count = tasks.len(), file = %file.display(), "Found tasks");
            for task in &tasks {
                info!(
                    due = %task.due_date,
                    subject = %task.subject,
                    priority = %task.priority,
                    status = %task.status,
                    "Task"
                );
            }
        }
    }

    Ok(())
}

async fn run_serve(port: u16, output: PathBuf, opts: html::RenderOptions) -> Result<()> {
    // The chat panel degrades to its static fallback without an endpoint
    let assistant = match assistant::Assistant::from_env() {
        Ok(a) => Some(a),
        Err(e) => {
            warn!(error = %e, "Assistant disabled");
            None
        }
    };

    server::serve(port, output, opts, assistant).await
}
