pub mod severity;
pub mod record;
pub mod encoder;
pub mod sink;
pub mod noop_sink;
pub mod config;
pub mod logger;

pub mod env;
pub mod global;
pub mod context;
pub mod task;

pub mod layer;
pub mod init;

pub use config::{BuildError, LoggerConfig};
pub use context::{from_context, with_logger, Context};
pub use env::new_logger_from_env;
pub use global::{default_logger, set_default_logger};
pub use logger::{new_logger, Logger};
pub use record::FieldValue;
pub use severity::{NamedLevel, Severity};
