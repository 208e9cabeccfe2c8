//! gh-traffic library exports.

pub mod ansi;
pub mod config;
pub mod github;
pub mod history;
pub mod progress;
pub mod report;
pub mod tile;

pub use tile::{Layout, Margin, Tile};
