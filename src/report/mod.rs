//! Dashboard assembly and report generation.

pub mod dashboard;
pub mod generator;

pub use dashboard::Dashboard;
pub use generator::{generate_json_report, generate_markdown_report};
