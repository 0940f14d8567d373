// Library surface for the binary, headless integration tests, and reuse.
// The binary only adds argument parsing and terminal setup on top.
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod compare;
pub mod config;
pub mod keymap;
pub mod logging;
pub mod metrics;
pub mod passage;
pub mod runtime;
pub mod segment;
pub mod session;
pub mod store;
pub mod timer;
pub mod ui;
