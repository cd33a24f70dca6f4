//! Model endpoint descriptor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Descriptor for the model endpoint a prompt is composed for.
///
/// The composer reads only three things from it: the prompt token budget,
/// the model family (reminder wording), and the strong-hint capability flag.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelEndpoint {
    /// Model identifier, e.g. "gpt-5-codex".
    pub model: String,
    /// Model family identifier, e.g. "gpt", "claude".
    pub family: String,
    /// Total prompt token budget.
    pub max_prompt_tokens: usize,
    /// Whether this model needs the strong replace-string preference hint.
    #[serde(default)]
    pub needs_strong_replace_hint: bool,
}

impl ModelEndpoint {
    pub fn new(model: impl Into<String>, family: impl Into<String>, max_prompt_tokens: usize) -> Self {
        Self {
            model: model.into(),
            family: family.into(),
            max_prompt_tokens,
            needs_strong_replace_hint: false,
        }
    }

    pub fn with_strong_replace_hint(mut self) -> Self {
        self.needs_strong_replace_hint = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoint = ModelEndpoint::new("gpt-5-codex", "gpt", 128_000);

        assert_eq!(endpoint.max_prompt_tokens, 128_000);
        assert!(!endpoint.needs_strong_replace_hint);
        assert!(
            endpoint
                .with_strong_replace_hint()
                .needs_strong_replace_hint
        );
    }
}
