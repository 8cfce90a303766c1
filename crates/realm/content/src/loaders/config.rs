//! World configuration loader.

use std::path::Path;

use realm_core::RealmConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for world configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from a TOML file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> LoadResult<RealmConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RealmConfig> {
        let config: RealmConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.month_days == 0 {
            anyhow::bail!("month_days must be at least 1");
        }
        if usize::from(config.engagement_tier) >= RealmConfig::TIERS {
            anyhow::bail!(
                "engagement_tier {} is outside 0..{}",
                config.engagement_tier,
                RealmConfig::TIERS
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::{IdRange, Kind};

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("month_days = 10\n").unwrap();
        assert_eq!(config.month_days, 10);
        assert_eq!(config.max_orders_per_queue, RealmConfig::DEFAULT_MAX_ORDERS);
        assert_eq!(config.id_ranges, RealmConfig::default().id_ranges);
    }

    #[test]
    fn id_ranges_can_be_overridden() {
        let config = ConfigLoader::parse(
            r#"
            [[id_ranges]]
            kind = "char"
            ranges = [{ low = 7000, high = 7099 }]
            "#,
        )
        .unwrap();
        assert_eq!(config.id_ranges.len(), 1);
        assert_eq!(config.id_ranges[0].kind, Kind::Char);
        assert_eq!(config.id_ranges[0].ranges, vec![IdRange::new(7000, 7099)]);
    }

    #[test]
    fn rejects_out_of_range_engagement_tier() {
        assert!(ConfigLoader::parse("engagement_tier = 9\n").is_err());
        assert!(ConfigLoader::parse("month_days = 0\n").is_err());
    }

    #[test]
    fn shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/config.toml");
        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.month_days, 30);
    }
}
