use super::{AssemblerConfig, ConfigResult, ConfigValidator};
use crate::assembler::MarkerPair;

/// Builder for AssemblerConfig
///
/// Starts with no marker pairs; `build` falls back to the default pair when
/// none were added.
#[derive(Debug, Clone, Default)]
pub struct AssemblerConfigBuilder {
    markers: Vec<MarkerPair>,
    native_reasoning_bypass: bool,
}

impl AssemblerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker pair; pairs are matched in insertion order
    pub fn with_marker(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.markers.push(MarkerPair::new(open, close));
        self
    }

    pub fn with_marker_pair(mut self, pair: MarkerPair) -> Self {
        self.markers.push(pair);
        self
    }

    pub fn native_reasoning_bypass(mut self, enabled: bool) -> Self {
        self.native_reasoning_bypass = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> ConfigResult<AssemblerConfig> {
        let config = AssemblerConfig {
            markers: if self.markers.is_empty() {
                AssemblerConfig::default().markers
            } else {
                self.markers
            },
            native_reasoning_bypass: self.native_reasoning_bypass,
        };
        ConfigValidator::validate_assembler(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_builder_defaults_to_think_markers() {
        let config = AssemblerConfig::builder().build().unwrap();
        assert_eq!(config, AssemblerConfig::default());
    }

    #[test]
    fn test_builder_keeps_marker_order() {
        let config = AssemblerConfig::builder()
            .with_marker_pair(MarkerPair::think())
            .with_marker("<reasoning>", "</reasoning>")
            .native_reasoning_bypass(true)
            .build()
            .unwrap();

        assert_eq!(
            config.markers,
            vec![MarkerPair::think(), MarkerPair::reasoning()]
        );
        assert!(config.native_reasoning_bypass);
    }

    #[test]
    fn test_builder_validates() {
        let result = AssemblerConfig::builder().with_marker("", "</x>").build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
