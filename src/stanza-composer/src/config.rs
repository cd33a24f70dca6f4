//! Composer configuration.

use serde::{Deserialize, Deserializer, Serialize};

/// Configuration for prompt composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Whether cache breakpoints are emitted.
    #[serde(default = "default_true")]
    pub caching_enabled: bool,
    /// Whether a summarized history replaces raw history when a summary is
    /// available.
    #[serde(default)]
    pub summarization_enabled: bool,
    /// Whether the tasks fragment may be included.
    #[serde(default = "default_true")]
    pub tasks_enabled: bool,
    /// Deterministic simulation mode: volatile content (the current date) is
    /// omitted so renders taken on different days are identical.
    #[serde(default)]
    pub simulation: bool,
    /// Largest share of the total budget a single tool result may occupy
    /// (ratio 0.0-1.0).
    #[serde(
        default = "default_tool_result_fraction",
        deserialize_with = "deserialize_fraction"
    )]
    pub tool_result_budget_fraction: f32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            caching_enabled: true,
            summarization_enabled: false,
            tasks_enabled: true,
            simulation: false,
            tool_result_budget_fraction: default_tool_result_fraction(),
        }
    }
}

impl ComposerConfig {
    /// The per-tool-result token cap for a given total budget.
    pub fn tool_result_cap(&self, budget: usize) -> usize {
        ((budget as f64) * f64::from(self.tool_result_budget_fraction)) as usize
    }
}

/// Deserialize the tool-result fraction with validation (must be 0.0-1.0).
fn deserialize_fraction<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f32::deserialize(deserializer)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(serde::de::Error::custom(
            "tool_result_budget_fraction must be between 0.0 and 1.0",
        ));
    }
    Ok(value)
}

fn default_true() -> bool {
    true
}

fn default_tool_result_fraction() -> f32 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ComposerConfig::default();

        assert!(config.caching_enabled);
        assert!(!config.summarization_enabled);
        assert!(config.tasks_enabled);
        assert!(!config.simulation);
        assert_eq!(config.tool_result_cap(10_000), 5_000);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: ComposerConfig = serde_json::from_str("{}").unwrap();
        assert!(config.caching_enabled);
        assert_eq!(config.tool_result_budget_fraction, 0.5);
    }

    #[test]
    fn test_out_of_range_fraction_rejected() {
        let result: Result<ComposerConfig, _> =
            serde_json::from_str(r#"{"tool_result_budget_fraction": 1.5}"#);
        assert!(result.is_err());
    }
}
