//! Scan result formatting
//!
//! - `text` - coloured listing of the requested buckets with a summary line
//! - `json` - pretty-printed `ScanReport`s

mod config;
mod json;
mod text;

pub use config::OutputConfig;
pub use json::{print_json, to_json};
pub use text::TextFormatter;
