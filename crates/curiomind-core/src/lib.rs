pub mod config;
pub mod error;
pub mod types;

pub use config::CurioConfig;
pub use error::{CurioError, Result};
pub use types::*;
