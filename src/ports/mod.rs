//! Port traits: the boundaries the domain talks to.

pub mod config_port;
pub mod data_port;
pub mod progress_port;
pub mod report_port;
pub mod universe_port;
