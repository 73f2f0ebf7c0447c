pub mod error;
pub mod config;
pub mod backup;
pub mod filename;
pub mod telemetry;

pub use error::*;
pub use config::*;
pub use backup::*;
pub use filename::*;
pub use telemetry::*;
