use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use codepad_core::ports::SnippetStore;
use codepad_core::snippets::{code_from_url, share_url};
use codepad_core::capture::serve_worker;
use codepad_core::{
    CaptureEngine, ExecutionLimits, IsolatedRunner, ProcessRunner, Settings, Snippet,
};
use tracing::warn;

use crate::constants::{messages, WELCOME_CODE};
use crate::types::StatusMessage;

#[derive(Parser, Debug)]
#[clap(name = "codepad")]
#[clap(about = "Terminal JavaScript playground", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Open the editor with the code carried by a share link
    #[clap(long)]
    pub url: Option<String>,

    /// Open the editor with a saved snippet
    #[clap(long)]
    pub snippet: Option<i64>,

    /// Keep snippets in memory for this session only
    #[clap(long)]
    pub ephemeral: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a file (or stdin with `-`) and print the captured output
    Run {
        #[clap(default_value = "-")]
        file: PathBuf,
    },
    /// Print a share link for a file
    Share { file: PathBuf },
    /// Save a file as a snippet
    Save { file: PathBuf },
    /// Manage saved snippets
    Snippets {
        #[clap(subcommand)]
        action: SnippetAction,
    },
    /// Run stdin as a snippet and stream events; spawned by the editor
    #[clap(hide = true)]
    Worker {
        #[clap(long)]
        loop_limit: u64,
        #[clap(long)]
        recursion_limit: usize,
    },
}

impl Command {
    pub const WORKER: &'static str = "worker";
}

#[derive(Subcommand, Debug)]
pub enum SnippetAction {
    List,
    Show { id: i64 },
    Delete { id: i64 },
}

/// Read source from `path`, or stdin for `-`.
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code).context("reading stdin")?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

pub fn format_snippet_list(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return "No saved snippets".to_string();
    }
    snippets
        .iter()
        .map(|s| {
            format!(
                "{}\t{}\t{}",
                s.id,
                s.name,
                s.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Code the editor opens with, plus a status to show if a source could not be loaded.
pub async fn resolve_initial_code(
    url: Option<&str>,
    snippet: Option<i64>,
    store: &dyn SnippetStore,
) -> (String, Option<StatusMessage>) {
    if let Some(link) = url {
        match code_from_url(link) {
            Some(code) => return (code, None),
            None => {
                return (
                    WELCOME_CODE.to_string(),
                    Some(StatusMessage::error("Failed to load shared code")),
                )
            }
        }
    }

    if let Some(id) = snippet {
        match store.get(id).await {
            Ok(Some(saved)) => return (saved.code, None),
            Ok(None) => {
                return (
                    WELCOME_CODE.to_string(),
                    Some(StatusMessage::error(format!("No snippet with id {}", id))),
                )
            }
            Err(e) => {
                warn!(error = %e, id, "loading snippet failed");
                return (
                    WELCOME_CODE.to_string(),
                    Some(StatusMessage::error(format!("Failed to load snippet: {}", e))),
                );
            }
        }
    }

    (WELCOME_CODE.to_string(), None)
}

/// Runner that executes each snippet in a child `codepad worker` process.
pub fn worker_runner(program: impl Into<PathBuf>, settings: &Settings) -> ProcessRunner {
    let args = vec![
        Command::WORKER.to_string(),
        "--loop-limit".to_string(),
        settings.loop_iteration_limit.to_string(),
        "--recursion-limit".to_string(),
        settings.recursion_limit.to_string(),
    ];
    ProcessRunner::new(program, args, Duration::from_millis(settings.run_timeout_ms))
}

/// Run one headless subcommand, writing its result to `out`.
pub async fn run_command<W: Write>(
    command: Command,
    settings: &Settings,
    store: &dyn SnippetStore,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Run { file } => {
            let code = read_source(&file)?;
            let result = IsolatedRunner::from_settings(settings).run(&code).await;
            writeln!(out, "{}", result)?;
        }
        Command::Share { file } => {
            let code = read_source(&file)?;
            writeln!(out, "{}", share_url(&settings.share_base_url, &code)?)?;
        }
        Command::Save { file } => {
            let code = read_source(&file)?;
            let saved = store.save(&code).await?;
            writeln!(out, "{} ({}, id {})", messages::SNIPPET_SAVED, saved.name, saved.id)?;
        }
        Command::Snippets { action } => run_snippet_action(action, store, out).await?,
        Command::Worker { loop_limit, recursion_limit } => {
            let code = read_source(Path::new("-"))?;
            let engine = CaptureEngine::new(ExecutionLimits {
                loop_iteration_limit: loop_limit,
                recursion_limit,
            });
            serve_worker(engine, &code, out)?;
        }
    }
    Ok(())
}

async fn run_snippet_action<W: Write>(
    action: SnippetAction,
    store: &dyn SnippetStore,
    out: &mut W,
) -> Result<()> {
    match action {
        SnippetAction::List => {
            writeln!(out, "{}", format_snippet_list(&store.list().await?))?;
        }
        SnippetAction::Show { id } => match store.get(id).await? {
            Some(snippet) => writeln!(out, "{}", snippet.code)?,
            None => bail!("no snippet with id {}", id),
        },
        SnippetAction::Delete { id } => {
            if !store.delete(id).await? {
                bail!("no snippet with id {}", id);
            }
            writeln!(out, "Deleted snippet {}", id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::MemoryStore;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["codepad", "run"]);
        assert!(matches!(cli.command, Some(Command::Run { ref file }) if file == Path::new("-")));

        let cli = Cli::parse_from(["codepad", "snippets", "show", "42"]);
        assert!(matches!(
            cli.command,
            Some(Command::Snippets { action: SnippetAction::Show { id: 42 } })
        ));

        let cli = Cli::parse_from(["codepad", "--ephemeral", "--snippet", "7"]);
        assert!(cli.command.is_none());
        assert!(cli.ephemeral);
        assert_eq!(cli.snippet, Some(7));
    }

    #[test]
    fn worker_runner_passes_limits() {
        let settings = Settings { loop_iteration_limit: 5, recursion_limit: 6, ..Settings::default() };
        let runner = worker_runner("/bin/codepad", &settings);
        assert_eq!(runner.timeout(), Duration::from_millis(settings.run_timeout_ms));

        let cli = Cli::parse_from(
            ["codepad", "worker", "--loop-limit", "5", "--recursion-limit", "6"],
        );
        assert!(matches!(
            cli.command,
            Some(Command::Worker { loop_limit: 5, recursion_limit: 6 })
        ));
    }

    #[tokio::test]
    async fn initial_code_prefers_share_link() {
        let store = MemoryStore::new();
        let (code, status) =
            resolve_initial_code(Some("https://codepad.local/?code=console.log(2)"), None, &store).await;
        assert_eq!(code, "console.log(2)");
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn bad_sources_fall_back_to_welcome_code() {
        let store = MemoryStore::new();
        let (code, status) = resolve_initial_code(Some("https://codepad.local/"), None, &store).await;
        assert_eq!(code, WELCOME_CODE);
        assert_eq!(status, Some(StatusMessage::error("Failed to load shared code")));

        let (code, status) = resolve_initial_code(None, Some(1), &store).await;
        assert_eq!(code, WELCOME_CODE);
        assert!(status.is_some());
    }

    #[tokio::test]
    async fn initial_code_loads_saved_snippet() {
        let store = MemoryStore::new();
        let saved = store.save("console.info(3)").await.unwrap();
        let (code, _) = resolve_initial_code(None, Some(saved.id), &store).await;
        assert_eq!(code, "console.info(3)");
    }

    #[test]
    fn empty_list_says_so() {
        assert_eq!(format_snippet_list(&[]), "No saved snippets");
    }
}
