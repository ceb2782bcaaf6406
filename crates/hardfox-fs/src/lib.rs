//! Filesystem primitives for hardfox
//!
//! Provides normalized path handling, confinement of writes to a trusted
//! root directory, and locked atomic I/O used by every writer in the
//! workspace.

pub mod checksum;
pub mod config;
pub mod error;
pub mod guard;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use guard::DirectoryGuard;
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, resolve_within, validate_file_name};
