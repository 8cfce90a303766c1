//! Content factory for building worlds from data files.

use std::path::{Path, PathBuf};

use realm_core::{RealmConfig, World};

use crate::loaders::{ConfigLoader, LoadResult, Scenario, ScenarioLoader};

/// Content factory that loads world content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── scenarios/
///     └── demo.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load world configuration from `config.toml`, or defaults if absent.
    pub fn load_config(&self) -> LoadResult<RealmConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(RealmConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    /// Config plus scenario, built into a fresh world.
    pub fn build_world(&self, scenario: &str) -> LoadResult<World> {
        let config = self.load_config()?;
        self.load_scenario(scenario)?.build(config)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
