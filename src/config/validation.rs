use std::net::SocketAddr;

use http::{HeaderName, HeaderValue, Method};
use tracing_subscriber::EnvFilter;

use crate::config::models::{CorsConfig, LoggingConfig, RelayConfig, UpstreamConfig};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Relay configuration validator
pub struct RelayConfigValidator;

impl RelayConfigValidator {
    /// Validate the entire relay configuration, reporting every problem at once
    pub fn validate(config: &RelayConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        if config.max_body_bytes == 0 {
            errors.push(ValidationError::InvalidField {
                field: "max_body_bytes".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }

        errors.extend(Self::validate_upstream(&config.upstream));
        errors.extend(Self::validate_cors(&config.cors));

        if let Err(e) = Self::validate_logging(&config.logging) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// Validate listen address format
    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:3000' or '0.0.0.0:8080')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_upstream(upstream: &UpstreamConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if upstream.origin.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "upstream.origin".to_string(),
            });
        } else if let Err(e) = Self::validate_origin(&upstream.origin) {
            errors.push(e);
        }

        if !upstream.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidField {
                field: "upstream.prefix".to_string(),
                message: format!("Prefix must start with '/', got '{}'", upstream.prefix),
            });
        } else if upstream.prefix.len() > 1 && upstream.prefix.ends_with('/') {
            errors.push(ValidationError::InvalidField {
                field: "upstream.prefix".to_string(),
                message: format!("Prefix must not end with '/', got '{}'", upstream.prefix),
            });
        }

        for name in &upstream.excluded_headers {
            if HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()).is_err() {
                errors.push(ValidationError::InvalidField {
                    field: "upstream.excluded_headers".to_string(),
                    message: format!("'{name}' is not a valid header name"),
                });
            }
        }

        errors
    }

    /// The origin is a bare scheme://host[:port]; the prefix supplies the path.
    fn validate_origin(origin: &str) -> ValidationResult<()> {
        let field = "upstream.origin".to_string();
        let url = url::Url::parse(origin).map_err(|e| ValidationError::InvalidField {
            field: field.clone(),
            message: format!("Invalid URL format: {e}"),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ValidationError::InvalidField {
                field,
                message: format!(
                    "URL scheme must be 'http' or 'https', got '{}'",
                    url.scheme()
                ),
            });
        }

        if url.host().is_none() {
            return Err(ValidationError::InvalidField {
                field,
                message: "URL must have a valid host".to_string(),
            });
        }

        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(ValidationError::InvalidField {
                field,
                message: "Origin must not carry a path, query or fragment".to_string(),
            });
        }

        Ok(())
    }

    fn validate_cors(cors: &CorsConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if HeaderValue::from_str(&cors.allow_origin).is_err() {
            errors.push(ValidationError::InvalidField {
                field: "cors.allow_origin".to_string(),
                message: format!("'{}' is not a valid header value", cors.allow_origin),
            });
        }

        for method in &cors.allow_methods {
            if method.parse::<Method>().is_err() {
                errors.push(ValidationError::InvalidField {
                    field: "cors.allow_methods".to_string(),
                    message: format!("'{method}' is not a valid HTTP method"),
                });
            }
        }

        for name in &cors.allow_headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidField {
                    field: "cors.allow_headers".to_string(),
                    message: format!("'{name}' is not a valid header name"),
                });
            }
        }

        errors
    }

    fn validate_logging(logging: &LoggingConfig) -> ValidationResult<()> {
        EnvFilter::try_new(&logging.level).map_err(|e| ValidationError::InvalidField {
            field: "logging.level".to_string(),
            message: format!("Invalid filter directive '{}': {e}", logging.level),
        })?;
        Ok(())
    }

    /// Format multiple validation errors into a single message
    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.is_empty() {
            return "No errors".to_string();
        }

        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("Found {} validation errors:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}
