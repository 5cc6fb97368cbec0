//! Environment-driven server configuration.
//!
//! Credential variables are all optional: which authentication mode works is
//! decided per call, not at startup. Email configuration is stricter: an
//! unset `EMAIL_PROVIDER` merely disables the email tools, but a set one with
//! broken provider settings is a startup failure, on the grounds that a
//! half-configured mailer would otherwise only surface at the first send.

use calendly_api::{CredentialConfig, Defaults};
use calendly_mailer::MailerConfig;

const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown EMAIL_PROVIDER {0:?} (expected sendgrid, resend, or smtp)")]
    UnknownProvider(String),

    #[error("{variable} is required when EMAIL_PROVIDER={provider}")]
    MissingVariable {
        provider: &'static str,
        variable: &'static str,
    },

    #[error("SMTP_PORT is not a valid port number: {0:?}")]
    InvalidPort(String),
}

#[derive(Debug)]
pub struct ServerConfig {
    pub credentials: CredentialConfig,
    pub defaults: Defaults,
    pub mailer: Option<MailerConfig>,
    pub from_email: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds from an arbitrary variable source (injectable for tests).
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let credentials = CredentialConfig {
            api_key: get("CALENDLY_API_KEY"),
            client_id: get("CALENDLY_CLIENT_ID"),
            client_secret: get("CALENDLY_CLIENT_SECRET"),
            access_token: get("CALENDLY_ACCESS_TOKEN"),
            refresh_token: get("CALENDLY_REFRESH_TOKEN"),
            auth_base_url: None,
        };

        let defaults = Defaults {
            user_uri: get("CALENDLY_USER_URI"),
            organization_uri: get("CALENDLY_ORGANIZATION_URI"),
        };

        let mailer = match get("EMAIL_PROVIDER") {
            None => None,
            Some(provider) => Some(mailer_config(&provider.to_lowercase(), &get)?),
        };

        Ok(Self {
            credentials,
            defaults,
            mailer,
            from_email: get("EMAIL_FROM"),
        })
    }
}

fn mailer_config(
    provider: &str,
    get: &impl Fn(&str) -> Option<String>,
) -> Result<MailerConfig, ConfigError> {
    let require = |provider: &'static str, variable: &'static str| {
        get(variable).ok_or(ConfigError::MissingVariable { provider, variable })
    };

    match provider {
        "sendgrid" => Ok(MailerConfig::Sendgrid {
            api_key: require("sendgrid", "SENDGRID_API_KEY")?,
            endpoint: None,
        }),
        "resend" => Ok(MailerConfig::Resend {
            api_key: require("resend", "RESEND_API_KEY")?,
            endpoint: None,
        }),
        "smtp" => {
            let port = match get("SMTP_PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(raw))?,
                None => DEFAULT_SMTP_PORT,
            };
            let secure = get("SMTP_SECURE")
                .is_some_and(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"));
            Ok(MailerConfig::Smtp {
                host: require("smtp", "SMTP_HOST")?,
                port,
                secure,
                username: require("smtp", "SMTP_USER")?,
                password: require("smtp", "SMTP_PASS")?,
            })
        }
        other => Err(ConfigError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn unset_provider_disables_email_without_failing() {
        let config = config_from(&[("CALENDLY_API_KEY", "pat_1")]).unwrap();
        assert!(config.mailer.is_none());
        assert_eq!(config.credentials.api_key.as_deref(), Some("pat_1"));
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config = config_from(&[("CALENDLY_API_KEY", "  "), ("EMAIL_PROVIDER", "")]).unwrap();
        assert!(config.credentials.api_key.is_none());
        assert!(config.mailer.is_none());
    }

    #[test]
    fn unknown_provider_is_fatal() {
        let error = config_from(&[("EMAIL_PROVIDER", "pigeon")]).unwrap_err();
        assert!(matches!(error, ConfigError::UnknownProvider(p) if p == "pigeon"));
    }

    #[test]
    fn sendgrid_requires_its_api_key() {
        let error = config_from(&[("EMAIL_PROVIDER", "sendgrid")]).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::MissingVariable {
                provider: "sendgrid",
                variable: "SENDGRID_API_KEY",
            }
        ));
    }

    #[test]
    fn provider_name_is_case_insensitive() {
        let config = config_from(&[
            ("EMAIL_PROVIDER", "Resend"),
            ("RESEND_API_KEY", "re-key"),
        ])
        .unwrap();
        assert!(matches!(config.mailer, Some(MailerConfig::Resend { .. })));
    }

    #[test]
    fn smtp_defaults_port_and_starttls() {
        let config = config_from(&[
            ("EMAIL_PROVIDER", "smtp"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "shh"),
        ])
        .unwrap();
        match config.mailer {
            Some(MailerConfig::Smtp { port, secure, .. }) => {
                assert_eq!(port, 587);
                assert!(!secure);
            }
            other => panic!("expected smtp config, got {other:?}"),
        }
    }

    #[test]
    fn smtp_rejects_a_garbage_port() {
        let error = config_from(&[
            ("EMAIL_PROVIDER", "smtp"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "not-a-port"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "shh"),
        ])
        .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidPort(_)));
    }
}
