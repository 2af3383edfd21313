pub mod config;
pub mod metrics;
pub mod ports;
pub mod runner;

pub use config::*;
pub use metrics::*;
pub use ports::*;
pub use runner::*;
