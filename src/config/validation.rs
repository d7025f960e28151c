//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every backend identifier is present
//! - Addresses parse, timeouts are non-zero
//!
//! `listener.bind_address` is `host:port`; the host may be a name such as
//! `localhost` and is resolved when the listener binds. The metrics address
//! must be a literal socket address.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is not set")]
    MissingConf(&'static str),

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let confs = [
        ("images3.conf", &config.images3.conf),
        ("imageprocessor.conf", &config.imageprocessor.conf),
        ("mongodb.conf", &config.mongodb.conf),
    ];
    for (name, value) in confs {
        if value.trim().is_empty() {
            errors.push(ValidationError::MissingConf(name));
        }
    }

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.provisioning.startup_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("provisioning.startup_timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A socket address literal, or `host:port` with a non-empty host and a valid port.
fn is_host_port(value: &str) -> bool {
    if value.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match value.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ConfReference;

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            images3: ConfReference::new("conf/images3.toml"),
            imageprocessor: ConfReference::new("conf/imageprocessor.toml"),
            mongodb: ConfReference::new("conf/mongodb.toml"),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_misses_confs() {
        let errors = validate_config(&GatewayConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingConf("images3.conf"),
                ValidationError::MissingConf("imageprocessor.conf"),
                ValidationError::MissingConf("mongodb.conf"),
            ]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.listener.bind_address = "not-an-address".to_string();
        config.timeouts.request_secs = 0;
        config.provisioning.startup_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroTimeout("timeouts.request_secs")));
        assert_eq!(
            errors[0].to_string(),
            "invalid listener.bind_address 'not-an-address'"
        );
    }

    #[test]
    fn test_bind_address_accepts_host_names() {
        let mut config = valid_config();
        for address in ["localhost:9000", "gateway.internal:80", "[::1]:8080", "0.0.0.0:0"] {
            config.listener.bind_address = address.to_string();
            assert!(validate_config(&config).is_ok(), "{address}");
        }
        for address in ["localhost", ":9000", "localhost:http", "localhost:70000", "::1"] {
            config.listener.bind_address = address.to_string();
            assert!(validate_config(&config).is_err(), "{address}");
        }
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "nope".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
