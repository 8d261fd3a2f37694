use std::time::{Duration, Instant};

use codepad::cli::worker_runner;
use codepad_core::Settings;

fn runner(timeout_ms: u64) -> codepad_core::ProcessRunner {
    let settings = Settings {
        run_timeout_ms: timeout_ms,
        loop_iteration_limit: 1_000_000_000,
        ..Settings::default()
    };
    worker_runner(env!("CARGO_BIN_EXE_codepad"), &settings)
}

#[tokio::test]
async fn worker_process_captures_output() {
    let result = runner(10_000)
        .run("console.error('e'); console.log({ a: [1] }); console.info('i');")
        .await;
    assert_eq!(
        result.render(),
        "LOG: {\n  \"a\": [\n    1\n  ]\n}\nINFO: i\nERROR: e"
    );
}

#[tokio::test]
async fn worker_process_reports_thrown_errors() {
    let result = runner(10_000).run("console.log('x'); throw new Error('bad');").await;
    assert_eq!(result.render(), "LOG: x\nEXECUTION ERROR: bad");
}

#[tokio::test]
async fn runaway_snippet_is_killed_at_deadline() {
    let started = Instant::now();
    let result = runner(2_000)
        .run("console.log('start'); for (;;) { for (;;) {} }")
        .await;
    assert_eq!(
        result.render(),
        "LOG: start\nEXECUTION ERROR: execution timed out after 2000 ms"
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}
