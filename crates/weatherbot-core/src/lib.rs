pub mod config;
pub mod error;
pub mod types;

pub use config::WeatherbotConfig;
pub use error::{Result, WeatherbotError};
pub use types::*;
