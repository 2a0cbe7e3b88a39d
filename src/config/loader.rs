//! Configuration loader for YAML files
//!
//! This module handles loading and validating the watchlist from YAML files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;

use super::types::AppConfig;

/// Environment variable overriding `check_interval_minutes`
pub const CHECK_INTERVAL_ENV: &str = "CHECK_INTERVAL_MINUTES";

/// Load configuration from a YAML file
///
/// This function:
/// 1. Checks if the file exists
/// 2. Parses the YAML content
/// 3. Applies environment overrides
/// 4. Validates the configuration rules
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use price_watch::config::load_config;
///
/// let config = load_config(Path::new("config.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut config: AppConfig = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e))
    })?;

    apply_env_overrides(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
///
/// Environment overrides are not applied.
pub fn load_config_from_str(yaml_content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

/// Apply `CHECK_INTERVAL_MINUTES` on top of the file value
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<(), AppError> {
    if let Ok(raw) = std::env::var(CHECK_INTERVAL_ENV) {
        let minutes: u64 = raw.trim().parse().map_err(|_| {
            AppError::Config(format!(
                "{} must be a whole number of minutes (got '{}')",
                CHECK_INTERVAL_ENV, raw
            ))
        })?;
        config.check_interval_minutes = minutes;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG_YAML: &str = r#"
check_interval_minutes: 10
quotes:
  base_url: https://api.coingecko.com/api/v3/simple/price
  vs_currency: usd
notifications:
  announce_on_start: false
items:
  - id: bitcoin
    symbol: BTC
    thresholds:
      - name: realistic
        price: 120000
      - name: optimistic
        price: 122000
  - id: ripple
    symbol: XRP
    name: Ripple
    thresholds:
      - name: realistic
        price: 3.0
      - name: optimistic
        price: 3.03
        icon: "🌕"
"#;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(VALID_CONFIG_YAML).unwrap();
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.items[0].id, "bitcoin");
        assert_eq!(config.items[1].thresholds[1].price, 3.03);
        assert_eq!(config.items[1].thresholds[1].icon.as_deref(), Some("🌕"));
        assert_eq!(config.check_interval_minutes, 10);
        assert!(!config.notifications.announce_on_start);
    }

    #[test]
    fn test_load_config_from_str_invalid_yaml() {
        let result = load_config_from_str("invalid: yaml: content: [");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_load_config_from_str_validation_failure() {
        let yaml = r#"
items:
  - id: solana
    symbol: SOL
    thresholds:
      - name: realistic
        price: 216
      - name: optimistic
        price: 215
"#;
        let result = load_config_from_str(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must be above"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.yaml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Configuration file not found"));
    }

    #[test]
    #[serial(env)]
    fn test_load_config_from_file_valid() {
        std::env::remove_var(CHECK_INTERVAL_ENV);
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_CONFIG_YAML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.check_interval_minutes, 10);
    }

    #[test]
    fn test_load_config_from_file_invalid_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"invalid: [yaml: content").unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    #[serial(env)]
    fn test_env_overrides_interval() {
        std::env::set_var(CHECK_INTERVAL_ENV, "2");

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_CONFIG_YAML.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        let result = load_config(temp_file.path());

        std::env::remove_var(CHECK_INTERVAL_ENV);
        assert_eq!(result.unwrap().check_interval_minutes, 2);
    }

    #[test]
    fn test_huge_interval_is_rejected() {
        let yaml = VALID_CONFIG_YAML.replace(
            "check_interval_minutes: 10",
            "check_interval_minutes: 18446744073709551615",
        );
        let result = load_config_from_str(&yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too large"));
    }

    #[test]
    #[serial(env)]
    fn test_env_override_rejects_garbage() {
        std::env::set_var(CHECK_INTERVAL_ENV, "soon");

        let mut config = load_config_from_str(VALID_CONFIG_YAML).unwrap();
        let result = apply_env_overrides(&mut config);

        std::env::remove_var(CHECK_INTERVAL_ENV);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains(CHECK_INTERVAL_ENV));
    }
}
