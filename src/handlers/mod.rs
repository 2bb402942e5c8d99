//! Handler implementations

pub mod console;
pub mod file;
pub(crate) mod maintenance;
pub mod multi;
pub mod rotating_file;

pub use crate::core::Handler;
pub use console::{ConsoleHandler, ConsoleTarget};
pub use file::FileHandler;
pub use multi::MultiHandler;
pub use rotating_file::{RotatingFileWriter, RotationPolicy, DEFAULT_MAX_SIZE_BYTES};
