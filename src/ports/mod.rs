//! Port traits at the I/O boundaries of the engine.

pub mod config_port;
pub mod data_port;
pub mod report_port;
