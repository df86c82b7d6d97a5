// src/config.rs
// =============================================================================
// Settings for an Inspector.
//
// Everything that used to be a tuning constant lives here and is passed in
// explicitly when the Inspector is built - there is no global state, so two
// inspectors with different limits can run side by side.
// =============================================================================

use std::time::Duration;

use crate::error::ConfigError;

/// Default cap on simultaneous link probes
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 256;

/// Desktop Chrome on Linux; bot-hostile sites answer 403 to obvious clients
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";

/// How relative hrefs ("docs/intro") are turned into probe URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelativeLinkPolicy {
    /// page URL + "/" + href - simple string join, no "../" handling
    #[default]
    Concatenate,
    /// Proper base-URL resolution (Url::join)
    Rfc3986,
}

#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// How many link probes may run at the same time
    pub max_concurrent_probes: usize,
    /// Timeout for each individual HTTP request (root page and probes)
    pub request_timeout: Duration,
    /// Stop reading the root page after this many bytes
    pub max_body_bytes: usize,
    pub relative_links: RelativeLinkPolicy,
    pub user_agent: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        InspectorConfig {
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 10 * 1024 * 1024,
            relative_links: RelativeLinkPolicy::Concatenate,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl InspectorConfig {
    // Rejects settings that would make the inspector useless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_probes == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = InspectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_concurrent_probes, 256);
        assert_eq!(config.relative_links, RelativeLinkPolicy::Concatenate);
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let config = InspectorConfig {
            max_concurrent_probes: 0,
            ..InspectorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));

        let config = InspectorConfig {
            max_body_bytes: 0,
            ..InspectorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBodyLimit)));

        let config = InspectorConfig {
            request_timeout: Duration::ZERO,
            ..InspectorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }
}
