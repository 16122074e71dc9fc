pub mod fixtures;

pub use fixtures::{LogDir, log_dir};
