//! Shared test utilities for the hardfox workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`profile`]: [`TestProfileDir`] builder for scratch browser profiles
//! - [`catalog`]: a small catalog covering every setting kind and tier

pub mod catalog;
pub mod profile;

pub use catalog::small_catalog;
pub use profile::TestProfileDir;
