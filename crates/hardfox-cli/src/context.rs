//! Configuration and catalog shared by every command

use std::path::Path;
use std::sync::Arc;

use hardfox_catalog::Catalog;
use hardfox_core::{HardfoxConfig, ProfileLibrary};

use crate::error::Result;

pub struct AppContext {
    pub config: HardfoxConfig,
    pub catalog: Arc<Catalog>,
}

impl AppContext {
    /// Load the config (explicit path or platform default) and its catalog.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = HardfoxConfig::load(config_path)?;
        let catalog = config.load_catalog()?;
        tracing::debug!(
            "Catalog {} with {} settings",
            catalog.version(),
            catalog.len()
        );
        Ok(Self { config, catalog })
    }

    pub fn library(&self) -> ProfileLibrary {
        ProfileLibrary::new(self.config.profiles_dir(), self.catalog.clone())
            .with_robustness(self.config.robustness())
    }
}
