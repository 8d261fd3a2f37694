use std::time::Duration;

use codepad_core::capture::{ExecutionResult, Transcript};
use codepad_core::mocks::{BrokenStore, ScriptedRunner};
use codepad_core::ports::SnippetStore;
use codepad_core::{start_core, ChannelOutbound, IsolatedRunner, MemoryStore, PlaygroundCore};
use protocol::Message;
use tokio::sync::mpsc;
use tokio::time::timeout;

async fn next(rx: &mut mpsc::Receiver<Message>) -> Message {
    timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("core replied in time")
        .expect("core channel open")
}

#[tokio::test]
async fn run_request_yields_run_result() {
    let mut handles = start_core(IsolatedRunner::default(), MemoryStore::new(), "https://codepad.local/");

    let request = Message::run_request(r#"console.log("a"); console.error("b"); console.log("c");"#);
    let Message::RunRequest(ref req) = request else { unreachable!() };
    let id = req.id.clone();
    handles.inbound_tx.send(request).await.unwrap();

    match next(&mut handles.outbound_rx).await {
        Message::RunResult(res) => {
            assert_eq!(res.reply_to, id);
            assert_eq!(res.output, "LOG: a\nLOG: c\nERROR: b");
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn runs_are_answered_in_order() {
    let mut handles = start_core(IsolatedRunner::default(), MemoryStore::new(), "https://codepad.local/");
    handles.inbound_tx.send(Message::run_request("console.log(1)")).await.unwrap();
    handles.inbound_tx.send(Message::run_request("")).await.unwrap();

    let outputs: Vec<String> = [next(&mut handles.outbound_rx).await, next(&mut handles.outbound_rx).await]
        .into_iter()
        .map(|m| match m {
            Message::RunResult(r) => r.output,
            other => panic!("unexpected reply: {other:?}"),
        })
        .collect();
    assert_eq!(outputs, vec!["LOG: 1", "Code executed successfully (no output)"]);
}

#[tokio::test]
async fn system_fault_is_rendered_for_the_ui() {
    let (tx, mut rx) = mpsc::channel(4);
    let runner = ScriptedRunner::new(ExecutionResult::SystemFault("runner panicked: oops".into()));
    let core = PlaygroundCore::new(runner, MemoryStore::new(), ChannelOutbound(tx), "https://codepad.local/");

    core.handle(Message::run_request("anything")).await.unwrap();
    match next(&mut rx).await {
        Message::RunResult(res) => assert_eq!(res.output, "SYSTEM ERROR: runner panicked: oops"),
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn save_request_stores_snippet() {
    let (tx, mut rx) = mpsc::channel(4);
    let store = std::sync::Arc::new(MemoryStore::new());
    let core = PlaygroundCore::new(
        ScriptedRunner::new(ExecutionResult::Transcript(Transcript::new())),
        store.clone(),
        ChannelOutbound(tx),
        "https://codepad.local/",
    );

    core.handle(Message::save_snippet("console.log('saved')")).await.unwrap();
    match next(&mut rx).await {
        Message::SnippetSaved(saved) => {
            assert_eq!(saved.name, "Snippet 1");
            assert!(saved.timestamp.ends_with('Z'));
        }
        other => panic!("unexpected reply: {other:?}"),
    }
    let all = store.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].code, "console.log('saved')");
}

#[tokio::test]
async fn failed_save_becomes_error_status() {
    let (tx, mut rx) = mpsc::channel(4);
    let core = PlaygroundCore::new(
        ScriptedRunner::new(ExecutionResult::Transcript(Transcript::new())),
        BrokenStore,
        ChannelOutbound(tx),
        "https://codepad.local/",
    );
    core.handle(Message::save_snippet("x")).await.unwrap();
    match next(&mut rx).await {
        Message::Status(status) => {
            assert_eq!(status.level, "error");
            assert!(status.text.contains("disk unavailable"), "{}", status.text);
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn share_request_yields_link() {
    let (tx, mut rx) = mpsc::channel(4);
    let core = PlaygroundCore::new(
        ScriptedRunner::new(ExecutionResult::Transcript(Transcript::new())),
        MemoryStore::new(),
        ChannelOutbound(tx),
        "https://codepad.local/pad",
    );
    core.handle(Message::share_request("console.log(1)")).await.unwrap();
    match next(&mut rx).await {
        Message::ShareLink(link) => {
            assert_eq!(link.url, "https://codepad.local/pad?code=console.log(1)");
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn outbound_only_messages_are_ignored() {
    let (tx, mut rx) = mpsc::channel(4);
    let runner = ScriptedRunner::new(ExecutionResult::Transcript(Transcript::new()));
    let core = PlaygroundCore::new(runner, MemoryStore::new(), ChannelOutbound(tx), "https://codepad.local/");
    core.handle(Message::status("info", "hello")).await.unwrap();
    core.handle(Message::share_link("https://x/")).await.unwrap();
    assert!(rx.try_recv().is_err());
}
