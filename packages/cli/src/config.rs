//! Credentials read from the environment.
//!
//! This is the only place the tools read environment variables. Everything
//! downstream receives credentials as explicit arguments.

use ltn_distance_routing::RouterCredentials;

/// Contact e-mail sent as the Nominatim `User-Agent`.
pub const USER_EMAIL_VAR: &str = "USER_EMAIL";

/// Google Directions API key for "before" distances.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_DIRECTIONS_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub user_email: Option<String>,
    pub google_api_key: Option<String>,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. Blank values count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            user_email: read(USER_EMAIL_VAR),
            google_api_key: read(GOOGLE_API_KEY_VAR),
        }
    }

    /// The geocoder `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable if `USER_EMAIL` is unset.
    pub fn user_agent(&self) -> Result<&str, String> {
        self.user_email
            .as_deref()
            .ok_or_else(|| format!("{USER_EMAIL_VAR} must be set to geocode postcodes"))
    }

    #[must_use]
    pub fn router_credentials(&self) -> RouterCredentials {
        RouterCredentials {
            google_api_key: self.google_api_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn reads_both_variables() {
        let config = config(&[
            ("USER_EMAIL", "analyst@example.com"),
            ("GOOGLE_DIRECTIONS_API_KEY", "abc123"),
        ]);
        assert_eq!(config.user_agent().unwrap(), "analyst@example.com");
        assert_eq!(
            config.router_credentials().google_api_key.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config(&[("USER_EMAIL", "  "), ("GOOGLE_DIRECTIONS_API_KEY", "")]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_email_names_the_variable() {
        let err = Config::default().user_agent().unwrap_err();
        assert!(err.contains("USER_EMAIL"));
    }
}
