//! Report browsing and PDF export for the admin pages of the research
//! platform: expert research listings with configurable columns and detail
//! sections, and a system metrics dashboard with charts.

pub mod chart;
pub mod config;
pub mod locale;
pub mod model;
pub mod options;
pub mod pdf;
pub mod progress;
pub mod render;
pub mod report;
pub mod source;
pub mod view;

#[cfg(test)]
mod tests;
