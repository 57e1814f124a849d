use crate::config::{Config, SCHEMA_VERSION};
use crate::error::{ImportPickError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every problem found
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_search(config, &mut errors);
        Self::validate_selector(config, &mut errors);
        Self::validate_ranking(config, &mut errors);
        Self::validate_session(config, &mut errors);
        Self::validate_project(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ImportPickError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.search.program.trim().is_empty() {
            errors.push(ValidationError::new(
                "search.program",
                "Search program cannot be empty",
            ));
        }

        if config.search.extensions.is_empty() {
            errors.push(ValidationError::new(
                "search.extensions",
                "At least one file extension is required",
            ));
        }

        for ext in &config.search.extensions {
            if !Self::is_plain_extension(ext) {
                errors.push(ValidationError::new(
                    "search.extensions",
                    format!("Extension must be alphanumeric without a dot: '{}'", ext),
                ));
            }
        }
    }

    fn validate_selector(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.selector.program.trim().is_empty() {
            errors.push(ValidationError::new(
                "selector.program",
                "Selector program cannot be empty",
            ));
        }
    }

    fn validate_ranking(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.ranking.batch_size == 0 {
            errors.push(ValidationError::new(
                "ranking.batch_size",
                "Batch size must be greater than 0",
            ));
        }
    }

    fn validate_session(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.session.grace_period_ms == 0 {
            errors.push(ValidationError::new(
                "session.grace_period_ms",
                "Grace period must be greater than 0",
            ));
        }
    }

    fn validate_project(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.project.root_markers.is_empty() {
            errors.push(ValidationError::new(
                "project.root_markers",
                "At least one project root marker is required",
            ));
        }
    }

    fn is_plain_extension(ext: &str) -> bool {
        !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
    }
}
