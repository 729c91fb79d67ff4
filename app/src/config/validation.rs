//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

use variant_engine::{DeclaredPolarity, DifficultyTier};

static RE_PAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap());
static RE_HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "MASTER_SOURCE" => {
            let value = value.trim();
            if value.is_empty() {
                return Err("must not be empty".into());
            }
            if value.starts_with("http") && value.contains("://") && !RE_HTTP_URL.is_match(value) {
                return Err("invalid URL (expected http:// or https://)".into());
            }
        }
        "PAGE_ID" => {
            if !RE_PAGE_ID.is_match(value) {
                return Err("must be 1-128 characters of A-Z, a-z, 0-9, '-' or '_'".into());
            }
        }
        "OUTPUT_DIR" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        "MASTER_POLARITY" => {
            value
                .parse::<DeclaredPolarity>()
                .map_err(|e| e.to_string())?;
        }
        "TIERS" => {
            let mut any = false;
            for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                part.parse::<DifficultyTier>().map_err(|e| e.to_string())?;
                any = true;
            }
            if !any {
                return Err("must list at least one tier".into());
            }
        }
        "FETCH_TIMEOUT_SECS" => validate_int_range(value, 1, 300)?,
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u64, max: u64) -> Result<(), String> {
    let v: u64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
