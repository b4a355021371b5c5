//! Auth configuration and shared handler state.

use std::time::Duration;

use crate::auth::AuthService;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_RESET_TOKEN_TTL_SECONDS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
    reset_token_ttl_seconds: i64,
    expose_reset_tokens: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            reset_token_ttl_seconds: DEFAULT_RESET_TOKEN_TTL_SECONDS,
            expose_reset_tokens: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_token_ttl_seconds = seconds;
        self
    }

    /// Test affordance: return raw reset tokens in API responses instead of
    /// leaving delivery to an out-of-band channel. Off by default.
    #[must_use]
    pub fn with_expose_reset_tokens(mut self, expose: bool) -> Self {
        self.expose_reset_tokens = expose;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds.max(0).unsigned_abs())
    }

    #[must_use]
    pub fn reset_token_ttl(&self) -> Duration {
        Duration::from_secs(self.reset_token_ttl_seconds.max(0).unsigned_abs())
    }

    #[must_use]
    pub fn expose_reset_tokens(&self) -> bool {
        self.expose_reset_tokens
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    service: AuthService,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, service: AuthService) -> Self {
        Self { config, service }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &AuthService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://app.custos.dev".to_string());

        assert_eq!(config.frontend_base_url(), "https://app.custos.dev");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.session_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.reset_token_ttl(), Duration::from_secs(3_600));
        assert!(!config.expose_reset_tokens());
        assert!(config.session_cookie_secure());

        let config = config
            .with_session_ttl_seconds(120)
            .with_reset_token_ttl_seconds(30)
            .with_expose_reset_tokens(true);

        assert_eq!(config.session_ttl(), Duration::from_secs(120));
        assert_eq!(config.reset_token_ttl(), Duration::from_secs(30));
        assert!(config.expose_reset_tokens());
    }

    #[test]
    fn plain_http_frontend_disables_secure_cookies() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn negative_ttls_clamp_to_zero() {
        let config = AuthConfig::new("http://localhost:3000".to_string())
            .with_session_ttl_seconds(-5)
            .with_reset_token_ttl_seconds(-5);
        assert_eq!(config.session_ttl(), Duration::ZERO);
        assert_eq!(config.reset_token_ttl(), Duration::ZERO);
    }
}
