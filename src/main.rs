use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plotline::autosave::Autosaver;
use plotline::backup::{self, ImportMode};
use plotline::config::Config;
use plotline::db::{Database, ProjectStore};
use plotline::editor::{self, Editor, SharedEditor};
use plotline::manuscript::{self, ManuscriptOptions};
use plotline::models::Project;
use plotline::{api, mcp, outline, tools};

#[derive(Parser)]
#[command(name = "plotline")]
#[command(about = "Outline, characters and notes for a novel, editable by hand or by an AI agent")]
struct Cli {
    /// Database file (defaults to the config file's, then the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one project over HTTP
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Project id (defaults to the most recently saved project)
        #[arg(long)]
        project: Option<String>,
    },
    /// Start MCP server via stdio for an external agent
    Mcp {
        #[arg(long)]
        project: Option<String>,
    },
    /// Create a project
    New {
        title: String,
        #[arg(long, default_value = "")]
        genre: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List stored projects
    List,
    /// Print the outline tree
    Tree {
        #[arg(long)]
        project: Option<String>,
        /// Show section ids
        #[arg(long)]
        ids: bool,
    },
    /// Write a backup of a project
    Export {
        #[arg(long)]
        project: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore a backup, as a new project or into an existing one
    Import {
        file: PathBuf,
        /// Import into this project instead of storing the backup as-is
        #[arg(long)]
        project: Option<String>,
        /// replace or merge (only with --project)
        #[arg(long, default_value = "replace")]
        mode: ImportMode,
    },
    /// Compile the project to Markdown
    Manuscript {
        #[arg(long)]
        project: Option<String>,
        /// Append notes
        #[arg(long)]
        notes: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run one document tool, e.g. `apply addOutlineSection '{"title":"Ch. 1"}'`
    Apply {
        tool: String,
        #[arg(default_value = "{}")]
        arguments: String,
        #[arg(long)]
        project: Option<String>,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "plotline=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn open_database(cli_path: Option<PathBuf>, config: &Config) -> anyhow::Result<Database> {
    let path = match cli_path {
        Some(path) => path,
        None => config.database_path()?,
    };
    let db = Database::open(path)?;
    db.migrate()?;
    Ok(db)
}

/// The requested project, or the most recently saved one.
fn load_project(store: &dyn ProjectStore, id: Option<&str>) -> anyhow::Result<Project> {
    let id = match id {
        Some(id) => id.to_string(),
        None => match store.list()?.into_iter().next() {
            Some(summary) => summary.id,
            None => bail!("No projects yet; create one with `plotline new <title>`"),
        },
    };
    store
        .load(&id)?
        .with_context(|| format!("Project {} not found", id))
}

fn write_output(output: Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

/// Open `project` in a shared editor with an autosaver attached.
fn open_session(store: Arc<dyn ProjectStore>, project: Project, config: &Config) -> (SharedEditor, Autosaver) {
    let editor = Editor::with_history_limit(project, config.history_limit);
    let autosaver = Autosaver::spawn(store, editor.subscribe(), config.autosave_quiet_period());
    (editor.into_shared(), autosaver)
}

/// Stop the autosaver and write the final state directly.
async fn close_session(store: Arc<dyn ProjectStore>, editor: SharedEditor, autosaver: Autosaver) -> anyhow::Result<()> {
    autosaver.stop().await;
    let snapshot = editor::lock(&editor).snapshot();
    tokio::task::spawn_blocking(move || store.save(&snapshot)).await??;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // MCP mode needs stderr for logging since stdout is the protocol channel
    let use_stderr = matches!(cli.command, Some(Commands::Mcp { .. }));
    init_tracing(use_stderr);

    let config = Config::load();
    let db = open_database(cli.db, &config)?;
    let store: Arc<dyn ProjectStore> = Arc::new(db);

    match cli.command.unwrap_or(Commands::Serve {
        port: 3000,
        project: None,
    }) {
        Commands::Serve { port, project } => {
            let project = load_project(store.as_ref(), project.as_deref())?;
            tracing::info!("Serving project '{}' ({})", project.title, project.id);

            let (editor, autosaver) = open_session(Arc::clone(&store), project, &config);
            let state = api::AppState::new(Arc::clone(&editor)).with_save_status(autosaver.subscribe());
            let app = api::create_router(state).nest_service("/mcp", mcp::http_service(Arc::clone(&editor)));

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("Plotline server listening on http://127.0.0.1:{}", port);
            tracing::info!("MCP endpoint at http://127.0.0.1:{}/mcp", port);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;

            close_session(store, editor, autosaver).await?;
        }
        Commands::Mcp { project } => {
            let project = load_project(store.as_ref(), project.as_deref())?;
            let (editor, autosaver) = open_session(Arc::clone(&store), project, &config);

            mcp::run_stdio_server(Arc::clone(&editor)).await?;

            close_session(store, editor, autosaver).await?;
        }
        Commands::New {
            title,
            genre,
            description,
        } => {
            let project = Project::new(title, genre, description);
            store.save(&project)?;
            println!("{}", project.id);
        }
        Commands::List => {
            for summary in store.list()? {
                println!(
                    "{}  {}  {}",
                    summary.id,
                    summary.updated_at.format("%Y-%m-%d %H:%M"),
                    summary.title
                );
            }
        }
        Commands::Tree { project, ids } => {
            let project = load_project(store.as_ref(), project.as_deref())?;
            println!("{}", project.title);
            print!("{}", outline::render_tree(&project.outline, ids));
        }
        Commands::Export { project, output } => {
            let project = load_project(store.as_ref(), project.as_deref())?;
            write_output(output, &backup::export_json(&project)?)?;
        }
        Commands::Import {
            file,
            project,
            mode,
        } => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            match project {
                Some(id) => {
                    let mut editor = Editor::new(load_project(store.as_ref(), Some(&id))?);
                    let summary = backup::import_into(&mut editor, &text, mode)?;
                    store.save(editor.project())?;
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                None => {
                    let project = backup::parse(&text)?;
                    if store.load(&project.id)?.is_some() {
                        bail!(
                            "Project {} already exists; use --project {} to import into it",
                            project.id,
                            project.id
                        );
                    }
                    store.save(&project)?;
                    println!("{}", project.id);
                }
            }
        }
        Commands::Manuscript {
            project,
            notes,
            output,
        } => {
            let project = load_project(store.as_ref(), project.as_deref())?;
            let options = ManuscriptOptions {
                include_notes: notes,
                ..Default::default()
            };
            write_output(output, &manuscript::render_with(&project, options))?;
        }
        Commands::Apply {
            tool,
            arguments,
            project,
        } => {
            let mut editor = Editor::new(load_project(store.as_ref(), project.as_deref())?);
            let outcome = tools::execute_json(&mut editor, &tool, &arguments);
            if outcome.success {
                store.save(editor.project())?;
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}
