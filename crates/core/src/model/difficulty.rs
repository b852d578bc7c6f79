use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Difficulty tier; indexes a row of the score ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Tier::Easy => 0,
            Tier::Medium => 1,
            Tier::Hard => 2,
        }
    }

    /// Map a numeric tier, clamping anything above 2 to `Hard`.
    #[must_use]
    pub fn from_index_clamped(index: usize) -> Self {
        match index {
            0 => Tier::Easy,
            1 => Tier::Medium,
            _ => Tier::Hard,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// How the score tier of each question is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyMode {
    /// Tier follows the checkpoint block the question sits in.
    Automatic,
    /// Every question is scored on the same tier.
    Fixed(Tier),
}

/// Maps external difficulty identifiers (as used by the question source) to tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyTierMap {
    tiers: HashMap<String, Tier>,
}

impl DifficultyTierMap {
    /// Identifiers that select automatic mode rather than a fixed tier.
    pub const AUTOMATIC_IDENTIFIERS: [&'static str; 2] = ["automatic", "auto"];

    /// Empty map; only the automatic identifiers resolve.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tiers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, identifier: impl AsRef<str>, tier: Tier) -> Self {
        self.tiers.insert(normalize(identifier.as_ref()), tier);
        self
    }

    #[must_use]
    pub fn tier(&self, identifier: &str) -> Option<Tier> {
        self.tiers.get(&normalize(identifier)).copied()
    }

    /// Resolve an identifier into a session mode.
    ///
    /// Returns `None` for identifiers that are neither automatic nor mapped.
    #[must_use]
    pub fn resolve(&self, identifier: &str) -> Option<DifficultyMode> {
        let key = normalize(identifier);
        if Self::AUTOMATIC_IDENTIFIERS.contains(&key.as_str()) {
            return Some(DifficultyMode::Automatic);
        }
        self.tiers.get(&key).copied().map(DifficultyMode::Fixed)
    }
}

impl Default for DifficultyTierMap {
    fn default() -> Self {
        Self::new()
            .with("easy", Tier::Easy)
            .with("medium", Tier::Medium)
            .with("hard", Tier::Hard)
    }
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_resolves_tiers_and_automatic() {
        let map = DifficultyTierMap::default();
        assert_eq!(map.resolve("Easy"), Some(DifficultyMode::Fixed(Tier::Easy)));
        assert_eq!(map.resolve(" hard "), Some(DifficultyMode::Fixed(Tier::Hard)));
        assert_eq!(map.resolve("automatic"), Some(DifficultyMode::Automatic));
        assert_eq!(map.resolve("AUTO"), Some(DifficultyMode::Automatic));
        assert_eq!(map.resolve("nightmare"), None);
    }

    #[test]
    fn custom_map_uses_external_identifiers() {
        let map = DifficultyTierMap::new()
            .with("1", Tier::Easy)
            .with("2", Tier::Medium)
            .with("3", Tier::Hard);
        assert_eq!(map.tier("2"), Some(Tier::Medium));
        assert_eq!(map.resolve("3"), Some(DifficultyMode::Fixed(Tier::Hard)));
        assert_eq!(map.resolve("easy"), None);
    }

    #[test]
    fn clamps_tier_index() {
        assert_eq!(Tier::from_index_clamped(0), Tier::Easy);
        assert_eq!(Tier::from_index_clamped(1), Tier::Medium);
        assert_eq!(Tier::from_index_clamped(7), Tier::Hard);
    }
}
