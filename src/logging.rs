use env_logger::{Env, Target};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Sends `log` output to a file, since stdout belongs to the TUI.
///
/// Reads `RUST_LOG` (default `info`). Returns false when the file cannot be
/// opened or a logger is already installed; logging then stays off.
pub fn init(path: &Path) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
