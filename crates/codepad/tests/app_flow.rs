use std::time::Duration;

use codepad::app::{App, AppCommand};
use codepad::clipboard::MemoryClipboard;
use codepad::constants::messages;
use codepad::types::{Mode, StatusLevel};
use codepad_core::mocks::BrokenStore;
use codepad_core::{start_core, IsolatedRunner, MemoryStore, Settings, Theme};
use tokio::time::timeout;

fn app_with_code(code: &str) -> App {
    let handles = start_core(IsolatedRunner::default(), MemoryStore::new(), "https://codepad.local/");
    let mut app = App::new(Settings::default(), handles, Box::new(MemoryClipboard::default()), code);
    app.settings_path = None;
    app
}

async fn await_reply(app: &mut App) {
    let received = timeout(Duration::from_secs(10), app.next_core_message())
        .await
        .expect("core replied in time");
    assert!(received, "core channel closed");
}

#[tokio::test]
async fn run_replaces_output_with_rendered_transcript() {
    let mut app = app_with_code(r#"console.log("a"); console.error("b"); console.warn("c");"#);

    app.apply_command(AppCommand::Run).await.unwrap();
    assert_eq!(app.mode, Mode::Executing);

    await_reply(&mut app).await;
    assert_eq!(app.mode, Mode::Idle);
    assert_eq!(app.output, vec!["LOG: a", "WARN: c", "ERROR: b"]);
    assert!(app.last_elapsed_ms.is_some());
}

#[tokio::test]
async fn second_run_is_refused_while_executing() {
    let mut app = app_with_code("console.log(1)");

    app.apply_command(AppCommand::Run).await.unwrap();
    app.apply_command(AppCommand::Run).await.unwrap();
    assert_eq!(app.status.as_ref().map(|s| s.text.as_str()), Some(messages::ALREADY_RUNNING));

    await_reply(&mut app).await;
    assert_eq!(app.output, vec!["LOG: 1"]);
    assert_eq!(app.mode, Mode::Idle);
}

#[tokio::test]
async fn empty_editor_reports_no_output() {
    let mut app = app_with_code("");
    app.apply_command(AppCommand::Run).await.unwrap();
    await_reply(&mut app).await;
    assert_eq!(app.output, vec!["Code executed successfully (no output)"]);
}

#[tokio::test]
async fn thrown_error_shows_execution_error() {
    let mut app = app_with_code("throw new Error(\"boom\")");
    app.apply_command(AppCommand::Run).await.unwrap();
    await_reply(&mut app).await;
    assert_eq!(app.output, vec!["EXECUTION ERROR: boom"]);
}

#[tokio::test]
async fn save_reports_snippet_name() {
    let mut app = app_with_code("console.log(1)");
    app.apply_command(AppCommand::Save).await.unwrap();
    await_reply(&mut app).await;

    let status = app.status.clone().expect("status set");
    assert_eq!(status.level, StatusLevel::Info);
    assert_eq!(status.text, format!("{} (Snippet 1)", messages::SNIPPET_SAVED));
}

#[tokio::test]
async fn failed_save_shows_error_status() {
    let handles = start_core(IsolatedRunner::default(), BrokenStore, "https://codepad.local/");
    let mut app = App::new(Settings::default(), handles, Box::new(MemoryClipboard::default()), "x");
    app.apply_command(AppCommand::Save).await.unwrap();
    await_reply(&mut app).await;
    assert_eq!(app.status.map(|s| s.level), Some(StatusLevel::Error));
}

#[tokio::test]
async fn share_copies_link() {
    let mut app = app_with_code("console.log(1)");
    app.apply_command(AppCommand::Share).await.unwrap();
    await_reply(&mut app).await;
    assert_eq!(app.status.map(|s| s.text), Some(messages::LINK_COPIED.to_string()));
}

#[tokio::test]
async fn share_falls_back_to_showing_link() {
    let handles = start_core(IsolatedRunner::default(), MemoryStore::new(), "https://codepad.local/");
    let clipboard = MemoryClipboard { contents: None, fail: true };
    let mut app = App::new(Settings::default(), handles, Box::new(clipboard), "a b");
    app.apply_command(AppCommand::Share).await.unwrap();
    await_reply(&mut app).await;
    assert_eq!(
        app.status.map(|s| s.text),
        Some(format!("{} https://codepad.local/?code=a%20b", messages::COPY_LINK_FALLBACK))
    );
}

#[tokio::test]
async fn clear_and_theme_commands() {
    let mut app = app_with_code("console.log(1)");
    app.set_output("LOG: 1\nLOG: 2");

    let tx = app.command_sender();
    tx.send(AppCommand::ClearOutput).await.unwrap();
    tx.send(AppCommand::ToggleTheme).await.unwrap();
    app.process_commands().await.unwrap();

    assert!(app.output.is_empty());
    assert_eq!(app.theme, Theme::Dark);
    assert_eq!(app.settings.theme, Theme::Dark);
}

#[tokio::test]
async fn theme_toggle_persists_to_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut app = app_with_code("");
    app.settings_path = Some(path.clone());

    app.apply_command(AppCommand::ToggleTheme).await.unwrap();
    assert_eq!(Settings::load_from(&path).unwrap().theme, Theme::Dark);
}
