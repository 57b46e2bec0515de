pub mod config;
pub mod error;
pub mod types;

pub use config::CareConfig;
pub use error::{CareError, Result};
