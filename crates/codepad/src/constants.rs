pub const MAX_OUTPUT_LINES: usize = 1000;
pub const POLL_INTERVAL_MS: u64 = 50;
pub const TAB_WIDTH: usize = 2;
pub const PAGE_SCROLL: usize = 10;

pub const WELCOME_CODE: &str = "// Welcome to codepad!\n\
console.log(\"Hello, World!\");\n\
\n\
// Try writing some JavaScript code here\n\
const greeting = \"Welcome to the playground!\";\n\
console.log(greeting);";

pub mod prefixes {
    pub const LOG: &str = "LOG:";
    pub const WARN: &str = "WARN:";
    pub const INFO: &str = "INFO:";
    pub const ERROR: &str = "ERROR:";
    pub const EXECUTION_ERROR: &str = "EXECUTION ERROR:";
    pub const SYSTEM_ERROR: &str = "SYSTEM ERROR:";
}

pub mod messages {
    pub const SNIPPET_SAVED: &str = "Code snippet saved!";
    pub const LINK_COPIED: &str = "Share link copied to clipboard!";
    pub const COPY_LINK_FALLBACK: &str = "Copy this link to share:";
    pub const ALREADY_RUNNING: &str = "A run is already in progress";
    pub const EXECUTING: &str = "Executing code...";
}
