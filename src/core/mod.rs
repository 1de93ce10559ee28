pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use config::TrackerConfig;
pub use context::TrackerContext;
pub use error::{Result, TrackerError};
