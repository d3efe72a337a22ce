//! Tunables of an inference run.

use serde::{Deserialize, Serialize};
use transnet_core::{TokenPolicy, TransnetError, TransnetResult};

/// Inference configuration. Every field has a default, so a partial TOML/JSON
/// document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Stations farther than this from the seed (centroid to centroid, in
    /// projected metres) are not considered as circuit endpoints
    #[serde(default = "default_neighborhood_radius")]
    pub neighborhood_radius: f64,
    /// Separator convention for `ref`/`name` token lists
    #[serde(default)]
    pub token_policy: TokenPolicy,
    /// Tracked voltage classes, in volts
    #[serde(default = "default_voltage_classes")]
    pub voltage_classes: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            neighborhood_radius: default_neighborhood_radius(),
            token_policy: TokenPolicy::default(),
            voltage_classes: default_voltage_classes(),
        }
    }
}

fn default_neighborhood_radius() -> f64 {
    300_000.0
}

fn default_voltage_classes() -> Vec<String> {
    ["110000", "220000", "380000"]
        .iter()
        .map(|v| v.to_string())
        .collect()
}

impl InferenceConfig {
    pub fn with_neighborhood_radius(mut self, radius: f64) -> Self {
        self.neighborhood_radius = radius;
        self
    }

    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    pub fn with_voltage_classes(mut self, classes: Vec<String>) -> Self {
        self.voltage_classes = classes;
        self
    }

    pub fn validate(&self) -> TransnetResult<()> {
        if !self.neighborhood_radius.is_finite() || self.neighborhood_radius < 0.0 {
            return Err(TransnetError::Config(format!(
                "neighborhood_radius must be a non-negative finite number, got {}",
                self.neighborhood_radius
            )));
        }
        if self.voltage_classes.iter().all(|v| v.trim().is_empty()) {
            return Err(TransnetError::Config(
                "at least one voltage class is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InferenceConfig::default();
        assert_eq!(config.neighborhood_radius, 300_000.0);
        assert_eq!(config.token_policy, TokenPolicy::Semicolon);
        assert_eq!(config.voltage_classes, vec!["110000", "220000", "380000"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: InferenceConfig =
            serde_json::from_str(r#"{"token_policy": "semicolon-or-comma"}"#).unwrap();
        assert_eq!(config.token_policy, TokenPolicy::SemicolonOrComma);
        assert_eq!(config.neighborhood_radius, 300_000.0);
        assert_eq!(config.voltage_classes.len(), 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let negative = InferenceConfig::default().with_neighborhood_radius(-1.0);
        assert!(negative.validate().is_err());
        let empty = InferenceConfig::default().with_voltage_classes(vec![" ".to_string()]);
        assert!(empty.validate().is_err());
    }
}
