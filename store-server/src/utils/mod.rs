//! Utility modules: error taxonomy, logging, validation helpers

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResult};
pub use logger::{init_logger, init_logger_with_file};
