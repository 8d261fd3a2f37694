pub mod app;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod constants;
pub mod editor;
pub mod handlers;
pub mod logger;
pub mod types;
pub mod ui;
