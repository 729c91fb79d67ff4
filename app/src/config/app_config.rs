//! Runtime configuration read from environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use variant_engine::{DeclaredPolarity, DifficultyTier, MasterSource};

use super::validation::validate_setting;

const DEFAULT_PAGE_ID: &str = "page";
const DEFAULT_OUTPUT_DIR: &str = "./variants";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("Invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Everything one run of the variant generator needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub master_source: MasterSource,
    pub page_id: String,
    pub output_dir: PathBuf,
    pub polarity: DeclaredPolarity,
    pub tiers: Vec<DifficultyTier>,
    pub fetch_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `get`, treating blank values as unset.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let g = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match get(key) {
                Some(v) if !v.trim().is_empty() => {
                    validate_setting(key, &v)
                        .map_err(|message| ConfigError::Invalid { key, message })?;
                    Ok(Some(v))
                }
                _ => Ok(None),
            }
        };

        let master_source = g("MASTER_SOURCE")?
            .map(|v| MasterSource::parse(&v))
            .ok_or(ConfigError::Missing("MASTER_SOURCE"))?;

        let page_id = g("PAGE_ID")?.unwrap_or_else(|| DEFAULT_PAGE_ID.into());

        let output_dir = g("OUTPUT_DIR")?
            .map(|v| expand_home(v.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        // Values below were validated by `g`, so the fallbacks are unreachable.
        let polarity = g("MASTER_POLARITY")?
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let tiers = g("TIERS")?
            .map(|v| parse_tiers(&v))
            .unwrap_or_else(|| DifficultyTier::ALL.to_vec());

        let fetch_timeout = Duration::from_secs(
            g("FETCH_TIMEOUT_SECS")?
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
        );

        Ok(Self {
            master_source,
            page_id,
            output_dir,
            polarity,
            tiers,
            fetch_timeout,
        })
    }
}

fn parse_tiers(s: &str) -> Vec<DifficultyTier> {
    let mut tiers = Vec::new();
    for tier in s.split(',').filter_map(|p| p.trim().parse().ok()) {
        if !tiers.contains(&tier) {
            tiers.push(tier);
        }
    }
    tiers
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => Path::new(raw).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("MASTER_SOURCE", "masters/dino.png")]).unwrap();
        assert_eq!(
            config.master_source,
            MasterSource::Path(PathBuf::from("masters/dino.png"))
        );
        assert_eq!(config.page_id, "page");
        assert_eq!(config.output_dir, PathBuf::from("./variants"));
        assert_eq!(config.polarity, DeclaredPolarity::InkOnWhite);
        assert_eq!(config.tiers, DifficultyTier::ALL.to_vec());
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MASTER_SOURCE", "https://cdn.example.com/dino.png"),
            ("PAGE_ID", "dino-7"),
            ("OUTPUT_DIR", "/srv/pages"),
            ("MASTER_POLARITY", "ink-on-black"),
            ("TIERS", "advanced, quick-easy, advanced"),
            ("FETCH_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(
            config.master_source,
            MasterSource::Url("https://cdn.example.com/dino.png".into())
        );
        assert_eq!(config.page_id, "dino-7");
        assert_eq!(config.output_dir, PathBuf::from("/srv/pages"));
        assert_eq!(config.polarity, DeclaredPolarity::InkOnBlack);
        assert_eq!(
            config.tiers,
            vec![DifficultyTier::Intermediate, DifficultyTier::QuickEasy]
        );
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_source() {
        let err = load(&[("MASTER_SOURCE", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MASTER_SOURCE")));
    }

    #[test]
    fn test_invalid_value_names_key() {
        let err = load(&[("MASTER_SOURCE", "a.png"), ("FETCH_TIMEOUT_SECS", "900")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid FETCH_TIMEOUT_SECS: must be between 1 and 300"
        );
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/dir"), PathBuf::from("/abs/dir"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/pages"), home.join("pages"));
        }
    }
}
