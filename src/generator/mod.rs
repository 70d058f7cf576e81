pub mod context;
pub mod graph;
pub mod prompt;
pub mod runner;
pub mod types;

pub mod component;
pub mod dashboard;
pub mod iframe;
pub mod rechart;
pub mod ui_component;
