use boa_engine::error::JsNativeErrorKind;
use boa_engine::object::ObjectInitializer;
use boa_engine::{
    js_string, Context, JsError, JsNativeError, JsObject, JsResult, JsString, JsValue,
    NativeFunction,
};
use tracing::{debug, warn};

use super::format::format_args;
use super::transcript::{Channel, ExecutionResult, Sink};
use crate::error::Result;

pub const DEFAULT_LOOP_ITERATION_LIMIT: u64 = 10_000_000;
pub const DEFAULT_RECURSION_LIMIT: usize = 512;

const UNDEFINED: &str = "undefined";

/// Hard limits applied to every evaluation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            loop_iteration_limit: DEFAULT_LOOP_ITERATION_LIMIT,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

/// Runs snippets and captures their console calls.
///
/// Every run gets a fresh evaluation context whose only logging surface is the
/// `console` parameter handed to the snippet.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureEngine {
    limits: ExecutionLimits,
}

impl CaptureEngine {
    pub fn new(limits: ExecutionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }

    /// Run `source` and return the display text. Never fails.
    pub fn execute(&self, source: &str) -> String {
        self.run(source).render()
    }

    pub fn run(&self, source: &str) -> ExecutionResult {
        self.run_with_sink(source, &Sink::new())
    }

    /// Run `source` into `sink` and close it. Capture failures become a system fault.
    pub fn run_with_sink(&self, source: &str, sink: &Sink) -> ExecutionResult {
        match self.run_into(source, sink).and_then(|()| sink.close()) {
            Ok(transcript) => ExecutionResult::Transcript(transcript),
            Err(err) => {
                warn!(error = %err, "capture machinery failed");
                ExecutionResult::SystemFault(err.to_string())
            }
        }
    }

    /// Run `source`, recording console calls and any snippet fault into `sink`.
    ///
    /// Returns an error only when the capture machinery itself fails.
    pub fn run_into(&self, source: &str, sink: &Sink) -> Result<()> {
        let mut context = self.new_context();
        let console = build_console(sink, &mut context);

        if let Err(err) = invoke(source, console, &mut context) {
            let message = fault_message(&err, &mut context);
            debug!(%message, "snippet raised");
            sink.fault(message)?;
        }
        Ok(())
    }

    fn new_context(&self) -> Context {
        let mut context = Context::default();
        let limits = context.runtime_limits_mut();
        limits.set_loop_iteration_limit(self.limits.loop_iteration_limit);
        limits.set_recursion_limit(self.limits.recursion_limit);
        context
    }
}

fn build_console(sink: &Sink, context: &mut Context) -> JsObject {
    let mut console = ObjectInitializer::new(context);
    for channel in Channel::ALL {
        console.function(
            console_method(channel, sink.clone()),
            JsString::from(channel.method()),
            0,
        );
    }
    console.build()
}

fn console_method(channel: Channel, sink: Sink) -> NativeFunction {
    // SAFETY: the closure only captures a `Sink`, which owns no garbage-collected values.
    unsafe {
        NativeFunction::from_closure(move |_this, args, context| {
            let message = format_args(args, context)?;
            sink.record(channel, message)
                .map_err(|e| JsNativeError::error().with_message(e.to_string()))?;
            Ok(JsValue::undefined())
        })
    }
}

/// Compile `source` as the body of `function (console) { ... }` and call it.
/// Compile and runtime faults both surface as the returned error.
fn invoke(source: &str, console: JsObject, context: &mut Context) -> JsResult<JsValue> {
    let function_ctor = context.intrinsics().constructors().function().constructor();
    let body = function_ctor.construct(
        &[js_string!("console").into(), JsString::from(source).into()],
        None,
        context,
    )?;
    body.call(&JsValue::undefined(), &[console.into()], context)
}

/// Text after `EXECUTION ERROR: `: the thrown value's `message` property,
/// stringified, so values without one read `undefined`.
fn fault_message(err: &JsError, context: &mut Context) -> String {
    // runtime limit errors cannot become script values
    if let Some(native) = err.as_native() {
        if matches!(native.kind, JsNativeErrorKind::RuntimeLimit) {
            return native.to_string();
        }
    }

    let thrown = err.to_opaque(context);
    if thrown.is_null_or_undefined() {
        return UNDEFINED.to_string();
    }
    let message = thrown
        .to_object(context)
        .and_then(|obj| obj.get(js_string!("message"), context))
        .and_then(|message| message.to_string(context));
    match message {
        Ok(text) => text.to_std_string_escaped(),
        Err(_) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::transcript::NO_OUTPUT;

    fn engine() -> CaptureEngine {
        CaptureEngine::default()
    }

    #[test]
    fn log_with_string_argument() {
        assert_eq!(engine().execute(r#"console.log("Hello, World!")"#), "LOG: Hello, World!");
    }

    #[test]
    fn empty_and_blank_source_yield_no_output_sentence() {
        assert_eq!(engine().execute(""), NO_OUTPUT);
        assert_eq!(engine().execute("  \n\t "), NO_OUTPUT);
    }

    #[test]
    fn normal_lines_precede_error_lines() {
        let out = engine().execute(r#"console.log("a"); console.error("b"); console.log("c");"#);
        assert_eq!(out, "LOG: a\nLOG: c\nERROR: b");
    }

    #[test]
    fn thrown_error_message_is_reported() {
        assert_eq!(engine().execute(r#"throw new Error("boom")"#), "EXECUTION ERROR: boom");
    }

    #[test]
    fn thrown_values_without_message_read_undefined() {
        assert_eq!(engine().execute(r#"throw "bare""#), "EXECUTION ERROR: undefined");
        assert_eq!(engine().execute("throw { code: 1 }"), "EXECUTION ERROR: undefined");
        assert_eq!(engine().execute("throw null"), "EXECUTION ERROR: undefined");
        assert_eq!(engine().execute("throw undefined"), "EXECUTION ERROR: undefined");
    }

    #[test]
    fn thrown_plain_object_with_message_uses_it() {
        assert_eq!(engine().execute(r#"throw { message: 42 }"#), "EXECUTION ERROR: 42");
    }

    #[test]
    fn syntax_error_is_caught() {
        let out = engine().execute("console.log(");
        assert!(out.starts_with("EXECUTION ERROR: "), "{out}");
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn output_before_fault_is_kept() {
        let out = engine().execute(r#"console.warn("w"); console.error("e"); null.x;"#);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "WARN: w");
        assert_eq!(lines[1], "ERROR: e");
        assert!(lines[2].starts_with("EXECUTION ERROR: "));
    }

    #[test]
    fn top_level_return_is_allowed() {
        assert_eq!(engine().execute("console.info(1); return; console.info(2);"), "INFO: 1");
    }

    #[test]
    fn no_ambient_console() {
        let out = engine().execute(r#"globalThis.console.log("x")"#);
        assert!(out.starts_with("EXECUTION ERROR: "), "{out}");
    }

    #[test]
    fn runaway_loop_hits_iteration_limit() {
        let engine = CaptureEngine::new(ExecutionLimits {
            loop_iteration_limit: 1_000,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        });
        let out = engine.execute("console.log('start'); while (true) {}");
        assert!(out.starts_with("LOG: start\nEXECUTION ERROR: "), "{out}");
    }

    #[test]
    fn deep_recursion_is_bounded() {
        let engine = CaptureEngine::new(ExecutionLimits {
            loop_iteration_limit: DEFAULT_LOOP_ITERATION_LIMIT,
            recursion_limit: 64,
        });
        let out = engine.execute("function f(n) { return f(n + 1); } f(0);");
        assert!(out.starts_with("EXECUTION ERROR: "), "{out}");
    }

    #[test]
    fn broken_transcript_is_a_system_error() {
        for source in ["", "console.log(1)"] {
            let sink = Sink::new();
            sink.poison();
            let result = engine().run_with_sink(source, &sink);
            assert!(result.is_system_fault());
            assert_eq!(result.render(), "SYSTEM ERROR: capture error: transcript lock poisoned");
        }
    }
}
