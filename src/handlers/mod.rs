//! Output side of the logger.
//!
//! [`rolling`] owns the log files on disk and [`file`] queues formatted
//! lines for a single background writer.

pub mod file;
pub mod rolling;
