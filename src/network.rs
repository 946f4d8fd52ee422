//! Network URL constants and deployment-mode base selection.

/// API base used while developing the UI against a local backend.
pub const DEV_API_URL: &str = "http://localhost:8000";

/// API base in production: the UI is served from `/static/`, so the API
/// root is one level up from the page.
pub const PRODUCTION_API_URL: &str = "..";

/// Prefix of every internal API resource.
pub const INTERNAL_PREFIX: &str = "/internal";

/// Environment variable that switches native consumers to development mode.
pub const DEV_ENV_VAR: &str = "BINP_DEV";

/// Which backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Development,
    Production,
}

impl Deployment {
    /// Deployment implied by the build profile: debug builds talk to a local
    /// backend, release builds to the origin that served them.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Deployment::Development
        } else {
            Deployment::Production
        }
    }

    /// Deployment selected by `BINP_DEV=true`, production otherwise.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        match std::env::var(DEV_ENV_VAR) {
            Ok(value) if value.eq_ignore_ascii_case("true") => Deployment::Development,
            _ => Deployment::Production,
        }
    }

    pub fn api_url(self) -> &'static str {
        match self {
            Deployment::Development => DEV_API_URL,
            Deployment::Production => PRODUCTION_API_URL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_per_deployment() {
        assert_eq!(Deployment::Development.api_url(), "http://localhost:8000");
        assert_eq!(Deployment::Production.api_url(), "..");
    }

    #[test]
    fn test_current_follows_build_profile() {
        let expected = if cfg!(debug_assertions) {
            Deployment::Development
        } else {
            Deployment::Production
        };
        assert_eq!(Deployment::current(), expected);
    }
}
