pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod progress;
pub mod render;
pub mod workflow;
