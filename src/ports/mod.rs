//! Port traits at the boundaries of the decision core.

pub mod config_port;
pub mod data_port;
pub mod report_port;
pub mod venue_port;
