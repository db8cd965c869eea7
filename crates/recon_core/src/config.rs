//! Reconstruction settings.
//!
//! Settings are stored as RON. Every field has a default, so an empty file
//! is a valid configuration.
//!
//! # Example RON
//!
//! ```ron
//! ReconConfig(
//!     turn_ceiling: 60,
//!     viewer: Some("alice"),
//!     price_overrides: { "Tank": 7500 },
//!     ratio_excluded_types: ["Infantry", "Mech"],
//!     ratio_day_limit: Some(6),
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cost::CostResolver;
use crate::error::{ReconError, Result};
use crate::report::RatioOptions;
use crate::roster::PartyId;
use crate::source::DEFAULT_TURN_CEILING;

/// Settings for one reconstruction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Highest number of turns to request before giving up.
    pub turn_ceiling: u32,
    /// Display name of the party whose view the replay reflects.
    pub viewer: Option<String>,
    /// Prices added to or replacing the standard list.
    pub price_overrides: BTreeMap<String, u32>,
    /// Unit types left out of the ratio report.
    pub ratio_excluded_types: Vec<String>,
    /// Only count units built on or before this day in the ratio report.
    pub ratio_day_limit: Option<u32>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            turn_ceiling: DEFAULT_TURN_CEILING,
            viewer: None,
            price_overrides: BTreeMap::new(),
            ratio_excluded_types: vec!["Infantry".to_string()],
            ratio_day_limit: None,
        }
    }
}

impl ReconConfig {
    /// Parse settings from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| ReconError::Config {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load settings from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ReconError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        ron::from_str(&text).map_err(|e| ReconError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Price table with the configured overrides applied.
    #[must_use]
    pub fn cost_resolver(&self) -> CostResolver {
        CostResolver::standard().with_overrides(&self.price_overrides)
    }

    /// Ratio report options, optionally restricted to one party.
    #[must_use]
    pub fn ratio_options(&self, party: Option<PartyId>) -> RatioOptions {
        RatioOptions {
            party,
            day_limit: self.ratio_day_limit,
            excluded_types: self.ratio_excluded_types.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ReconConfig::from_ron_str("()").unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.turn_ceiling, 100);
        assert_eq!(config.ratio_excluded_types, vec!["Infantry".to_string()]);
    }

    #[test]
    fn test_parse_full_config() {
        let config = ReconConfig::from_ron_str(
            r#"ReconConfig(
                turn_ceiling: 40,
                viewer: Some("alice"),
                price_overrides: { "Tank": 7500 },
                ratio_day_limit: Some(6),
            )"#,
        )
        .unwrap();

        assert_eq!(config.turn_ceiling, 40);
        assert_eq!(config.viewer.as_deref(), Some("alice"));
        assert_eq!(config.cost_resolver().resolve("tank", None), 7500);
        assert_eq!(config.ratio_options(None).day_limit, Some(6));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = ReconConfig::from_ron_str("ReconConfig(turn_ceiling: \"many\")").unwrap_err();
        assert!(matches!(err, ReconError::Config { .. }));
    }
}
