//! Configuration utility types.
//!
//! | Module   | Purpose                                   |
//! |----------|-------------------------------------------|
//! | `error`  | ConfigError and collected diagnostics     |
//! | `field`  | Dotted field paths for messages           |
//! | `handle` | Swappable config handle (thread-safe)     |

mod error;
mod field;
mod handle;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use field::FieldPath;
pub use handle::ConfigHandle;
