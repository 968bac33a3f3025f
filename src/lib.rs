// Library surface for the binary and the headless integration tests.
pub mod app_dirs;
pub mod config;
pub mod deck;
pub mod engine;
pub mod input;
pub mod logging;
pub mod overlay;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod slides;
pub mod store;
pub mod timers;
pub mod ui;
pub mod util;
