//! Inference settings from a TOML file plus command-line overrides.
//!
//! ```toml
//! neighborhood_radius = 150000.0
//! token_policy = "semicolon-or-comma"
//! voltage_classes = ["220000", "380000"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use transnet_algo::InferenceConfig;
use transnet_core::TokenPolicy;

/// Load the configuration at `path`, or the defaults without one.
pub fn load_inference_config(path: Option<&Path>) -> Result<InferenceConfig> {
    let Some(path) = path else {
        return Ok(InferenceConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    let config: InferenceConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing config '{}'", path.display()))?;
    Ok(config)
}

/// Apply flag overrides and validate the result.
pub fn resolve_inference_config(
    path: Option<&Path>,
    radius: Option<f64>,
    token_policy: Option<TokenPolicy>,
) -> Result<InferenceConfig> {
    let mut config = load_inference_config(path)?;
    if let Some(radius) = radius {
        config = config.with_neighborhood_radius(radius);
    }
    if let Some(policy) = token_policy {
        config = config.with_token_policy(policy);
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_gives_defaults() {
        let config = load_inference_config(None).unwrap();
        assert_eq!(config, InferenceConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transnet.toml");
        std::fs::write(&path, "voltage_classes = [\"380000\"]\n").unwrap();
        let config = load_inference_config(Some(&path)).unwrap();
        assert_eq!(config.voltage_classes, vec!["380000".to_string()]);
        assert_eq!(config.neighborhood_radius, 300_000.0);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transnet.toml");
        std::fs::write(
            &path,
            "neighborhood_radius = 1000.0\ntoken_policy = \"semicolon\"\n",
        )
        .unwrap();
        let config = resolve_inference_config(
            Some(&path),
            Some(2500.0),
            Some(TokenPolicy::SemicolonOrComma),
        )
        .unwrap();
        assert_eq!(config.neighborhood_radius, 2500.0);
        assert_eq!(config.token_policy, TokenPolicy::SemicolonOrComma);
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        assert!(resolve_inference_config(None, Some(-1.0), None).is_err());
    }
}
