//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Session token validation (HS256 JWT)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret used to verify user session tokens
    pub jwt_secret: Option<SecretString>,

    /// Expected `iss` claim, when set
    pub jwt_issuer: Option<String>,
}

impl AuthConfig {
    /// The secret, when configured and non-empty.
    pub fn secret(&self) -> Option<&SecretString> {
        self.jwt_secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())
    }

    /// Validate authentication configuration
    ///
    /// Production requires a secret. Elsewhere a missing secret falls back
    /// to the development session validator.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if environment == Environment::Production && self.secret().is_none() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_allowed_in_development() {
        let config = AuthConfig::default();
        assert!(config.validate(Environment::Development).is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AuthConfig::default();
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let config = AuthConfig {
            jwt_secret: Some(SecretString::new(String::new())),
            jwt_issuer: None,
        };
        assert!(config.secret().is_none());
        assert!(config.validate(Environment::Production).is_err());
    }

    #[test]
    fn test_production_with_secret() {
        let config = AuthConfig {
            jwt_secret: Some(SecretString::new("s3cret".to_string())),
            jwt_issuer: Some("xornet".to_string()),
        };
        assert!(config.validate(Environment::Production).is_ok());
    }
}
