use std::collections::HashSet;

use super::*;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> ConfigResult<()> {
        Self::validate_assembler(&config.assembler)?;
        Self::validate_extractor(&config.extractor)?;
        Ok(())
    }

    pub fn validate_assembler(config: &AssemblerConfig) -> ConfigResult<()> {
        if config.markers.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "assembler.markers".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, pair) in config.markers.iter().enumerate() {
            if pair.open.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("assembler.markers[{}].open", i),
                    value: String::new(),
                    reason: "Marker must not be empty".to_string(),
                });
            }
            if pair.close.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("assembler.markers[{}].close", i),
                    value: String::new(),
                    reason: "Marker must not be empty".to_string(),
                });
            }
            if pair.open == pair.close {
                return Err(ConfigError::InvalidValue {
                    field: format!("assembler.markers[{}]", i),
                    value: pair.open.clone(),
                    reason: "Open and close markers must differ".to_string(),
                });
            }
            if !seen.insert(pair.open.as_str()) {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("Duplicate open marker '{}'", pair.open),
                });
            }
        }

        Ok(())
    }

    pub fn validate_extractor(config: &ExtractorConfig) -> ConfigResult<()> {
        if config.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "extractor.max_depth".to_string(),
                value: config.max_depth.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
