//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the served directory and TLS files exist
//! - Check fallback specifiers and targets before the server is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::path::Path;

use crate::config::schema::{FallbackSetting, ServerConfig};
use crate::fallback::dispatcher::validate_target;
use crate::fallback::rules::ContentTypeSpecifier;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !Path::new(&config.path).is_dir() {
        errors.push(ValidationError::new(
            "path",
            format!("{:?} is not a directory", config.path),
        ));
    }

    match &config.fallback {
        None => {}
        Some(FallbackSetting::Path(target)) => {
            if let Err(e) = validate_target(target) {
                errors.push(ValidationError::new("fallback", e.to_string()));
            }
        }
        Some(FallbackSetting::Rules(rules)) => {
            for (key, target) in rules {
                let field = format!("fallback.{key}");
                if let Err(e) = key.parse::<ContentTypeSpecifier>() {
                    errors.push(ValidationError::new(&field, e.to_string()));
                }
                if let Err(e) = validate_target(target) {
                    errors.push(ValidationError::new(&field, e.to_string()));
                }
            }
        }
    }

    if let Some(tls) = &config.tls {
        if !Path::new(&tls.cert_path).is_file() {
            errors.push(ValidationError::new("tls.cert_path", "file not found"));
        }
        if !Path::new(&tls.key_path).is_file() {
            errors.push(ValidationError::new("tls.key_path", "file not found"));
        }
    }

    if !LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "log_level",
            format!("unknown level {:?}", config.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
