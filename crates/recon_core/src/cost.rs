//! Nominal unit prices.
//!
//! The service blanks the cost of units that were never seen at full
//! resolution. Reports fall back to the standard price list for those.

use std::collections::{BTreeMap, HashMap};

/// Standard price list, keyed by lowercase type name.
pub const STANDARD_PRICES: &[(&str, u32)] = &[
    ("infantry", 1000),
    ("mech", 3000),
    ("recon", 4000),
    ("apc", 5000),
    ("artillery", 6000),
    ("tank", 7000),
    ("anti-air", 8000),
    ("missile", 12000),
    ("rocket", 15000),
    ("md.tank", 16000),
    ("piperunner", 20000),
    ("neotank", 22000),
    ("mega tank", 28000),
    ("t-copter", 5000),
    ("b-copter", 9000),
    ("fighter", 20000),
    ("bomber", 22000),
    ("stealth", 24000),
    ("black bomb", 25000),
    ("black boat", 7500),
    ("lander", 12000),
    ("cruiser", 18000),
    ("sub", 20000),
    ("battleship", 28000),
    ("carrier", 30000),
];

/// Resolve a cost against the standard price list.
///
/// A present, non-zero observed cost wins. Otherwise the type is looked up
/// case-insensitively; unknown types cost 0.
#[must_use]
pub fn resolve(type_name: &str, observed: Option<u32>) -> u32 {
    match observed {
        Some(cost) if cost > 0 => cost,
        _ => STANDARD_PRICES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(type_name))
            .map_or(0, |(_, price)| *price),
    }
}

/// Price table with optional overrides on top of the standard list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostResolver {
    prices: HashMap<String, u32>,
}

impl Default for CostResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl CostResolver {
    /// Resolver using the standard price list.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            prices: STANDARD_PRICES
                .iter()
                .map(|(name, price)| ((*name).to_string(), *price))
                .collect(),
        }
    }

    /// Add or replace prices. Keys are matched case-insensitively.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, u32>) -> Self {
        for (name, price) in overrides {
            self.prices.insert(name.to_lowercase(), *price);
        }
        self
    }

    /// Table price for a type, if known.
    #[must_use]
    pub fn price_of(&self, type_name: &str) -> Option<u32> {
        self.prices.get(&type_name.to_lowercase()).copied()
    }

    /// Resolve a unit's cost. See [`resolve`].
    #[must_use]
    pub fn resolve(&self, type_name: &str, observed: Option<u32>) -> u32 {
        match observed {
            Some(cost) if cost > 0 => cost,
            _ => self.price_of(type_name).unwrap_or_else(|| {
                tracing::debug!(type_name, "No price for unit type");
                0
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_cost_wins() {
        assert_eq!(resolve("Tank", Some(6300)), 6300);
    }

    #[test]
    fn test_zero_cost_falls_back_case_insensitively() {
        assert_eq!(resolve("Tank", Some(0)), 7000);
        assert_eq!(resolve("TANK", None), 7000);
        assert_eq!(resolve("Md.Tank", None), 16000);
    }

    #[test]
    fn test_unknown_type_costs_nothing() {
        assert_eq!(resolve("Hovercraft", Some(0)), 0);
        assert_eq!(CostResolver::standard().resolve("Hovercraft", None), 0);
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Tank".to_string(), 7500);
        overrides.insert("Hovercraft".to_string(), 9000);
        let resolver = CostResolver::standard().with_overrides(&overrides);

        assert_eq!(resolver.resolve("tank", None), 7500);
        assert_eq!(resolver.resolve("HOVERCRAFT", Some(0)), 9000);
        assert_eq!(resolver.price_of("Infantry"), Some(1000));
    }

    #[test]
    fn test_resolver_matches_free_function() {
        let resolver = CostResolver::default();
        for (name, _) in STANDARD_PRICES {
            assert_eq!(resolver.resolve(name, None), resolve(name, None));
        }
    }
}
