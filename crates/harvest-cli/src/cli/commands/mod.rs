//! CLI command handlers. Each command is in its own file.

mod checkpoints;
mod discover;
mod download;
mod preprocess;
mod progress;
mod setup;

pub use checkpoints::run_checkpoints;
pub use discover::run_discover;
pub use download::run_download;
pub use preprocess::run_preprocess;
