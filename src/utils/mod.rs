pub mod cooldown;
pub mod logger;

pub use cooldown::Cooldown;
pub use logger::{init_logging, LoggingError};
