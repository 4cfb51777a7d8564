//! FURS client configuration.
//!
//! Two fixed environments exist, each with its own endpoints and its own
//! client-certificate organizational unit. Endpoint URLs can be overridden
//! through environment variables, e.g. to route through a local proxy.

use std::time::Duration;

use furs_core::ConfigurationError;
use url::Url;

const TEST_PREFIX: &str = "https://blagajne-test.fu.gov.si:9002/v1";
const PRODUCTION_PREFIX: &str = "https://blagajne.fu.gov.si:9003/v1";

const INVOICES_PATH: &str = "/cash_registers/invoices";
const PREMISES_PATH: &str = "/cash_registers/invoices/register";
const ECHO_PATH: &str = "/cash_registers/echo";

/// Endpoints and client-certificate selector of one FURS environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FursEnvironment {
    /// Invoice submission endpoint.
    pub invoices_url: Url,
    /// Business premise registration endpoint.
    pub premises_url: Url,
    /// Connectivity check endpoint.
    pub echo_url: Url,
    /// OU that identifies the client certificate in the key bundle.
    pub client_certificate_ou: String,
}

impl FursEnvironment {
    /// The test environment (`blagajne-test.fu.gov.si:9002`).
    pub fn test() -> Result<Self, ConfigurationError> {
        Self::with_prefix(TEST_PREFIX, "DavPotRacTEST")
    }

    /// The production environment (`blagajne.fu.gov.si:9003`).
    pub fn production() -> Result<Self, ConfigurationError> {
        Self::with_prefix(PRODUCTION_PREFIX, "DavPotRac")
    }

    /// All three endpoints under `prefix` (no trailing slash).
    pub fn with_prefix(prefix: &str, client_certificate_ou: &str) -> Result<Self, ConfigurationError> {
        let prefix = prefix.trim_end_matches('/');
        Ok(Self {
            invoices_url: parse_url("invoices", &format!("{prefix}{INVOICES_PATH}"))?,
            premises_url: parse_url("premises", &format!("{prefix}{PREMISES_PATH}"))?,
            echo_url: parse_url("echo", &format!("{prefix}{ECHO_PATH}"))?,
            client_certificate_ou: client_certificate_ou.to_string(),
        })
    }
}

/// Full client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FursConfig {
    pub environment: FursEnvironment,
    /// Transport timeout in seconds.
    pub timeout_secs: u64,
    /// Largest response body accepted, in bytes.
    pub max_response_bytes: usize,
}

impl FursConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `FURS_ENV` (`test` | `production`, default: `test`)
    /// - `FURS_INVOICES_URL`, `FURS_PREMISES_URL`, `FURS_ECHO_URL`
    ///   (default: the selected environment's endpoints)
    /// - `FURS_TIMEOUT_SECS` (default: 30)
    /// - `FURS_MAX_RESPONSE_BYTES` (default: 1 MiB)
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let mut environment = match std::env::var("FURS_ENV").as_deref() {
            Ok("test") | Err(_) => FursEnvironment::test()?,
            Ok("production") => FursEnvironment::production()?,
            Ok(other) => {
                return Err(ConfigurationError::InvalidSetting {
                    name: "FURS_ENV".to_string(),
                    value: other.to_string(),
                })
            }
        };

        environment.invoices_url = env_url("FURS_INVOICES_URL", environment.invoices_url)?;
        environment.premises_url = env_url("FURS_PREMISES_URL", environment.premises_url)?;
        environment.echo_url = env_url("FURS_ECHO_URL", environment.echo_url)?;

        Ok(Self {
            environment,
            timeout_secs: env_number("FURS_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?,
            max_response_bytes: env_number(
                "FURS_MAX_RESPONSE_BYTES",
                Self::DEFAULT_MAX_RESPONSE_BYTES,
            )?,
        })
    }

    /// A configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            environment: FursEnvironment::with_prefix(base_url, "DavPotRacTEST")?,
            timeout_secs: 5,
            max_response_bytes: Self::DEFAULT_MAX_RESPONSE_BYTES,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigurationError> {
    Url::parse(raw).map_err(|e| ConfigurationError::InvalidUrl {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn env_url(var: &str, default: Url) -> Result<Url, ConfigurationError> {
    match std::env::var(var) {
        Ok(raw) => parse_url(var, &raw),
        Err(_) => Ok(default),
    }
}

fn env_number<N: std::str::FromStr>(var: &str, default: N) -> Result<N, ConfigurationError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigurationError::InvalidSetting {
                name: var.to_string(),
                value: raw,
            }),
        Err(_) => Ok(default),
    }
}
