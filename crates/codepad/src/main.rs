use std::sync::Arc;
use std::{io, time::Duration};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use codepad::app::App;
use codepad::cli::{self, Cli};
use codepad::clipboard::SystemClipboard;
use codepad::handlers::InputHandler;
use codepad::ui::UI;
use codepad::{config, constants, logger};
use codepad_core::ports::SnippetStore;
use codepad_core::{start_core, JsonFileStore, MemoryStore, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = config::load_dotenv() {
        eprintln!("Warning: {}", e);
    }
    let settings = Settings::load();
    let args = Cli::parse();

    let store: Arc<dyn SnippetStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::in_dir(&settings.snippet_dir()))
    };

    if let Some(command) = args.command {
        logger::init_stderr_logging();
        let mut stdout = io::stdout().lock();
        return cli::run_command(command, &settings, store.as_ref(), &mut stdout).await;
    }

    let log_path = logger::init_file_logging(&settings.log_dir)?;
    eprintln!("Logging to: {}", log_path.display());

    let (initial_code, initial_status) =
        cli::resolve_initial_code(args.url.as_deref(), args.snippet, store.as_ref()).await;
    let runner = cli::worker_runner(std::env::current_exe()?, &settings);
    let handles = start_core(
        runner,
        store,
        settings.share_base_url.clone(),
    );
    let mut app = App::new(settings, handles, Box::new(SystemClipboard::new()), &initial_code);
    app.status = initial_status;

    let mut terminal = setup_terminal()?;
    let result = run_application(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        error!(error = %e, "application error");
        eprintln!("Error: {}", e);
    }
    info!("codepad exited");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_application<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.process_commands().await?;
        app.poll_core();

        terminal.draw(|frame| UI::draw(frame, app))?;

        if should_quit(app).await? {
            break;
        }
    }
    Ok(())
}

async fn should_quit(app: &mut App) -> Result<bool> {
    if event::poll(Duration::from_millis(constants::POLL_INTERVAL_MS))? {
        if let Event::Key(key) = event::read()? {
            return InputHandler::handle_key(app, key).await;
        }
    }
    Ok(false)
}
