//! Logging infrastructure — structured run history.
//!
//! Provides [`JsonlRunLogger`], a JSONL file writer that appends one line
//! per finished workflow run.

mod jsonl_logger;

pub use jsonl_logger::JsonlRunLogger;
