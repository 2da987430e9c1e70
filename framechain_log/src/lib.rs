//! Logging for framechain.

#[macro_use]
mod macros;

pub use log::{debug, info, warn};
