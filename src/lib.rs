// Library surface for the binary and for headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod matcher;
pub mod metrics;
pub mod runtime;
pub mod timer;
pub mod ui;
pub mod word_source;
