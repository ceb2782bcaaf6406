//! Command implementations

mod apply;
mod catalog;
mod import;
mod profiles;
mod recommend;

pub use apply::run_apply;
pub use catalog::{run_presets, run_settings};
pub use import::run_import;
pub use profiles::run_profiles;
pub use recommend::{RecommendArgs, run_recommend};
