//! Breeze CLI - Command-line interface for the TodoBreeze task list
//!
//! Signs in against the GraphQL todo service, keeps the session in a local
//! file slot, and renders the list from the same refetch-driven model the
//! graphical frontends use.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use breeze_core::api::TodoApi;
use breeze_core::auth::{AuthField, AuthForm, AuthGate, AuthMode, AuthPhase, LogoutOutcome};
use breeze_core::cache::QueryCache;
use breeze_core::config::ApiConfig;
use breeze_core::host::{ConfirmPrompt, ConfirmRequest, NavigationHost, Route};
use breeze_core::list::{DeleteOutcome, ListPhase, TodoListModel};
use breeze_core::models::{Todo, TodoId, TodoSummary, UserId};
use breeze_core::session::FileSessionStore;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};
use serde::Serialize;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "breeze")]
#[command(about = "Keep a synced todo list from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Optional directory for session and cache files
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Quick add: breeze "buy milk"
    #[arg(trailing_var_arg = true)]
    text: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an existing account
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Create an account and sign in
    Signup {
        /// Account email
        email: String,
        /// Account password
        password: String,
        /// Password, repeated
        confirm_password: String,
    },
    /// Clear the stored session
    Logout {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show who is signed in
    Status,
    /// List todos
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new todo
    #[command(alias = "new")]
    Add {
        /// Todo text
        text: Vec<String>,
    },
    /// Flip a todo between pending and completed
    Toggle {
        /// Todo ID
        id: String,
    },
    /// Delete a todo
    Delete {
        /// Todo ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] breeze_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No todo text provided")]
    EmptyTodoText,
    #[error("Todo ID cannot be empty")]
    EmptyTodoId,
    #[error("Not signed in. Run `breeze login <email> <password>` first.")]
    NotSignedIn,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

/// Session and cache locations under one data directory.
struct AppPaths {
    session: PathBuf,
    cache: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("breeze_core=info".parse().unwrap())
                .add_directive("breeze_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let paths = resolve_app_paths(cli.data_dir);
    let api = TodoApi::new(&ApiConfig::from_env()?);

    match cli.command {
        Some(Commands::Login { email, password }) => {
            run_login(&api, &paths, &email, &password).await?;
        }
        Some(Commands::Signup {
            email,
            password,
            confirm_password,
        }) => {
            run_signup(&api, &paths, &email, &password, &confirm_password).await?;
        }
        Some(Commands::Logout { yes }) => run_logout(&paths, yes)?,
        Some(Commands::Status) => run_status(&paths),
        Some(Commands::List { json }) => run_list(&api, &paths, json).await?,
        Some(Commands::Add { text }) => run_add(&api, &paths, &text).await?,
        Some(Commands::Toggle { id }) => run_toggle(&api, &paths, &id).await?,
        Some(Commands::Delete { id, yes }) => run_delete(&api, &paths, &id, yes).await?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            // Quick add mode: breeze "buy milk"
            if cli.text.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                run_add(&api, &paths, &cli.text).await?;
            }
        }
    }

    Ok(())
}

async fn run_login(
    api: &TodoApi,
    paths: &AppPaths,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let mut gate = AuthGate::new(FileSessionStore::new(&paths.session));
    let mut form = AuthForm::new();
    form.set_field(AuthField::Email, email);
    form.set_field(AuthField::Password, password);

    let account = gate.login(api, &mut form, &CliNavigation).await?;
    println!("Signed in as {} ({})", account.email, account.id);
    Ok(())
}

async fn run_signup(
    api: &TodoApi,
    paths: &AppPaths,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), CliError> {
    let mut gate = AuthGate::new(FileSessionStore::new(&paths.session));
    let mut form = AuthForm::new();
    form.set_mode(AuthMode::Signup);
    form.set_field(AuthField::Email, email);
    form.set_field(AuthField::Password, password);
    form.set_field(AuthField::ConfirmPassword, confirm_password);

    let account = gate.signup(api, &mut form, &CliNavigation).await?;
    println!("Account created; signed in as {} ({})", account.email, account.id);
    Ok(())
}

fn run_logout(paths: &AppPaths, assume_yes: bool) -> Result<(), CliError> {
    let mut gate = AuthGate::new(FileSessionStore::new(&paths.session));
    let AuthPhase::Authenticated(user_id) = gate.resolve(&CliNavigation).clone() else {
        println!("Not signed in");
        return Ok(());
    };

    match gate.logout(&cli_prompt(assume_yes), &CliNavigation) {
        LogoutOutcome::LoggedOut => {
            // The signed-out user's cached list has no further readers.
            let mut cache = QueryCache::load_snapshot(&paths.cache);
            cache.evict_user(&user_id);
            cache.save_snapshot(&paths.cache)?;
            println!("Signed out");
        }
        LogoutOutcome::Cancelled => println!("Cancelled"),
    }
    Ok(())
}

fn run_status(paths: &AppPaths) {
    let mut gate = AuthGate::new(FileSessionStore::new(&paths.session));
    match gate.resolve(&CliNavigation) {
        AuthPhase::Authenticated(user_id) => println!("Signed in as {user_id}"),
        _ => println!("Not signed in"),
    }
}

#[derive(Debug, Serialize)]
struct TodoListOutput<'a> {
    todos: &'a [Todo],
    total: usize,
    completed: usize,
    pending: usize,
}

async fn run_list(api: &TodoApi, paths: &AppPaths, as_json: bool) -> Result<(), CliError> {
    let mut model = attach_model(api, paths)?;
    model.refresh().await;
    warn_if_degraded(&model);

    let todos = model.visible_todos();
    let summary = model.summary();

    if as_json {
        let output = TodoListOutput {
            todos: &todos,
            total: summary.total,
            completed: summary.completed,
            pending: summary.pending,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if todos.is_empty() {
        println!("No tasks yet");
    } else {
        for line in format_todo_lines(&todos) {
            println!("{line}");
        }
        println!("{}", format_summary_line(summary));
    }

    model.cache_mut().save_snapshot(&paths.cache)?;
    Ok(())
}

async fn run_add(api: &TodoApi, paths: &AppPaths, text_parts: &[String]) -> Result<(), CliError> {
    let text = resolve_todo_text(text_parts)?;

    let mut model = attach_model(api, paths)?;
    let created = model.add(&text).await?;
    warn_if_degraded(&model);
    model.cache_mut().save_snapshot(&paths.cache)?;

    println!("{}", created.id);
    Ok(())
}

async fn run_toggle(api: &TodoApi, paths: &AppPaths, id: &str) -> Result<(), CliError> {
    let id = normalize_todo_identifier(id)?;

    let mut model = attach_model(api, paths)?;
    let patch = model.toggle(&TodoId::from(id)).await?;
    warn_if_degraded(&model);
    model.cache_mut().save_snapshot(&paths.cache)?;

    let state = if patch.completed { "completed" } else { "pending" };
    println!("{} {state}", patch.id);
    Ok(())
}

async fn run_delete(
    api: &TodoApi,
    paths: &AppPaths,
    id: &str,
    assume_yes: bool,
) -> Result<(), CliError> {
    let id = normalize_todo_identifier(id)?;

    let mut model = attach_model(api, paths)?;
    match model
        .delete(&TodoId::from(id.as_str()), &cli_prompt(assume_yes))
        .await?
    {
        DeleteOutcome::Deleted => {
            warn_if_degraded(&model);
            model.cache_mut().save_snapshot(&paths.cache)?;
            println!("{id}");
        }
        DeleteOutcome::Cancelled => println!("Cancelled"),
    }
    Ok(())
}

fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let mut command = Cli::command();
    let mut buffer = Vec::new();

    match shell {
        CompletionShell::Bash => generate_for_shell(shells::Bash, &mut command, &mut buffer),
        CompletionShell::Zsh => generate_for_shell(shells::Zsh, &mut command, &mut buffer),
        CompletionShell::Fish => generate_for_shell(shells::Fish, &mut command, &mut buffer),
    }

    if let Some(path) = output_path {
        std::fs::write(path, &buffer)?;
        println!("{}", path.display());
    } else {
        io::stdout().write_all(&buffer)?;
    }

    Ok(())
}

fn generate_for_shell<G: Generator>(
    generator: G,
    command: &mut clap::Command,
    buffer: &mut Vec<u8>,
) {
    generate(generator, command, "breeze", buffer);
}

// ---------------------------------------------------------------------------
// Host trait implementations
// ---------------------------------------------------------------------------

/// The CLI has no screen stack; route resets only matter in the log.
struct CliNavigation;

impl NavigationHost for CliNavigation {
    fn reset_to(&self, route: Route) {
        tracing::debug!(?route, "navigation reset");
    }
}

enum CliPrompt {
    Interactive,
    AssumeYes,
}

impl ConfirmPrompt for CliPrompt {
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        match self {
            Self::AssumeYes => true,
            Self::Interactive => prompt_stdin(request),
        }
    }
}

const fn cli_prompt(assume_yes: bool) -> CliPrompt {
    if assume_yes {
        CliPrompt::AssumeYes
    } else {
        CliPrompt::Interactive
    }
}

fn prompt_stdin(request: &ConfirmRequest) -> bool {
    print!("{}: {} [y/N] ", request.title, request.message);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    confirmed(&answer)
}

/// Anything other than an explicit yes declines.
fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn signed_in_user(paths: &AppPaths) -> Result<UserId, CliError> {
    let mut gate = AuthGate::new(FileSessionStore::new(&paths.session));
    match gate.resolve(&CliNavigation) {
        AuthPhase::Authenticated(user_id) => Ok(user_id.clone()),
        _ => Err(CliError::NotSignedIn),
    }
}

/// Build the list model for the signed-in user, seeded from the snapshot so
/// a dead network still renders the last known-good list.
fn attach_model(api: &TodoApi, paths: &AppPaths) -> Result<TodoListModel, CliError> {
    let user_id = signed_in_user(paths)?;
    let mut model = TodoListModel::new(api.clone(), QueryCache::load_snapshot(&paths.cache));
    model.attach_user(user_id);
    Ok(model)
}

fn warn_if_degraded(model: &TodoListModel) {
    if let ListPhase::Failed(message) = model.phase() {
        eprintln!("Warning: {message} (showing cached todos)");
    }
}

fn format_todo_lines(todos: &[Todo]) -> Vec<String> {
    todos
        .iter()
        .map(|todo| {
            let id = todo.id.to_string();
            let marker = if todo.completed { "[x]" } else { "[ ]" };
            format!("{id:<8}  {marker}  {}", todo.text)
        })
        .collect()
}

fn format_summary_line(summary: TodoSummary) -> String {
    format!(
        "{} total, {} completed, {} pending",
        summary.total, summary.completed, summary.pending
    )
}

fn resolve_todo_text(text_parts: &[String]) -> Result<String, CliError> {
    let joined = text_parts.join(" ");
    if joined.trim().is_empty() {
        return Err(CliError::EmptyTodoText);
    }
    Ok(joined)
}

fn normalize_todo_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyTodoId)
    } else {
        Ok(trimmed.to_string())
    }
}

fn resolve_app_paths(cli_data_dir: Option<PathBuf>) -> AppPaths {
    let base = cli_data_dir
        .or_else(|| env::var_os("BREEZE_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(default_data_dir);
    AppPaths {
        session: base.join("session.json"),
        cache: base.join("cache.json"),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("breeze")
}
