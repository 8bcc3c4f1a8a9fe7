//! Command-line host for the report dispatcher.
mod app;
mod cli;
mod config;
mod console;
mod logging;
mod preferences;

pub use app::run_app;
