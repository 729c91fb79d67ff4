//! Difficulty tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{self, VariantConfig};

/// Visual complexity of a generated page, easiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyTier {
    QuickEasy,
    Beginner,
    /// `advanced` is accepted as an alias and renders identically.
    #[serde(alias = "advanced")]
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown difficulty tier: {0}")]
pub struct UnknownTier(pub String);

impl DifficultyTier {
    /// Every tier, easiest first.
    pub const ALL: [Self; 3] = [Self::QuickEasy, Self::Beginner, Self::Intermediate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QuickEasy => "quick-easy",
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
        }
    }

    /// Static parameter set used to render this tier.
    pub const fn config(self) -> &'static VariantConfig {
        match self {
            Self::QuickEasy => &config::QUICK_EASY,
            Self::Beginner => &config::BEGINNER,
            Self::Intermediate => &config::INTERMEDIATE,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "quick-easy" | "quickeasy" | "quick" => Ok(Self::QuickEasy),
            "beginner" => Ok(Self::Beginner),
            "intermediate" | "advanced" => Ok(Self::Intermediate),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("quick-easy".parse(), Ok(DifficultyTier::QuickEasy));
        assert_eq!("Quick_Easy".parse(), Ok(DifficultyTier::QuickEasy));
        assert_eq!(" beginner ".parse(), Ok(DifficultyTier::Beginner));
        assert_eq!("intermediate".parse(), Ok(DifficultyTier::Intermediate));
    }

    #[test]
    fn test_advanced_is_intermediate() {
        assert_eq!("advanced".parse(), Ok(DifficultyTier::Intermediate));
        let tier: DifficultyTier = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(tier, DifficultyTier::Intermediate);
        assert_eq!(
            serde_json::to_string(&DifficultyTier::QuickEasy).unwrap(),
            "\"quick-easy\""
        );
    }

    #[test]
    fn test_unknown_tier() {
        assert_eq!(
            "expert".parse::<DifficultyTier>(),
            Err(UnknownTier("expert".into()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for tier in DifficultyTier::ALL {
            assert_eq!(tier.to_string().parse(), Ok(tier));
        }
    }
}
