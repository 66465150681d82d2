//! Structural validation for the pipelines file
//!
//! Checks the shape constraints that do not need the plugin registry or the
//! pipeline graph: those are enforced by the pipeline parser, which reports
//! connector and sink errors with full pipeline context.

use crate::error::{ConfigError, Result};
use crate::PipelinesConfig;

pub(crate) fn validate_pipelines(config: &PipelinesConfig) -> Result<()> {
    if config.is_empty() {
        return Err(ConfigError::invalid("no pipelines defined"));
    }

    for (name, definition) in config.iter() {
        if name.is_empty() {
            return Err(ConfigError::invalid("pipeline name must be non-empty"));
        }
        if definition.workers == 0 {
            return Err(ConfigError::invalid(format!(
                "pipeline '{name}': workers must be at least 1"
            )));
        }
        if definition.read_timeout == 0 {
            return Err(ConfigError::invalid(format!(
                "pipeline '{name}': read_timeout must be at least 1 millisecond"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
