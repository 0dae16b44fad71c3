//! Render pipeline sizing

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Capacities for command buffers, the render world and script tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Commands a script instance may record per update
    pub command_buffer_size: usize,
    /// Render objects a world can hold at once
    pub max_instances: usize,
    /// Render passes a world can hold
    pub max_render_passes: usize,
    /// Predicates a script instance may create over its lifetime
    pub max_predicates: usize,
    /// Tags kept per predicate; extra tags are ignored
    pub max_predicate_tags: usize,
    /// Instance-list capacity for passes that don't specify one
    pub default_pass_capacity: usize,
    /// Initial size of a script instance's material table
    pub material_capacity: usize,
}

impl RenderConfig {
    /// Create the default configuration
    pub const fn new() -> Self {
        Self {
            command_buffer_size: 1024,
            max_instances: 1024,
            max_render_passes: 16,
            max_predicates: 64,
            max_predicate_tags: 32,
            default_pass_capacity: 1024,
            material_capacity: 16,
        }
    }

    /// Reject sizes the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("command_buffer_size", self.command_buffer_size),
            ("max_instances", self.max_instances),
            ("max_render_passes", self.max_render_passes),
            ("max_predicates", self.max_predicates),
            ("max_predicate_tags", self.max_predicate_tags),
            ("default_pass_capacity", self.default_pass_capacity),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for RenderConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = RenderConfig::from_str_with_format("command_buffer_size = 8\n", "render.toml")
            .unwrap();
        assert_eq!(config.command_buffer_size, 8);
        assert_eq!(config.max_instances, 1024);
        assert_eq!(config.max_predicate_tags, 32);
    }

    #[test]
    fn test_ron_config() {
        let config =
            RenderConfig::from_str_with_format("(max_render_passes: 4)", "render.ron").unwrap();
        assert_eq!(config.max_render_passes, 4);
        assert_eq!(config.command_buffer_size, 1024);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = RenderConfig::from_str_with_format("", "render.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = RenderConfig {
            command_buffer_size: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "command_buffer_size", .. })
        ));
        assert!(RenderConfig::default().validate().is_ok());
    }
}
