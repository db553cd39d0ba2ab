//! Configuration for the backend client and the admin application

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Configuration options for the backend client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }
}

/// Settings the admin application needs at startup.
///
/// The service-role key bypasses row level security and must stay on the
/// server; `Debug` output never prints either key.
#[derive(Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub anon_key: String,
    pub service_role_key: String,
    /// Public base URL of the web application, used in password-reset links
    pub app_url: String,
    pub options: ClientOptions,
}

impl AppConfig {
    /// Create a new configuration, validating both URLs.
    pub fn new(
        supabase_url: &str,
        anon_key: &str,
        service_role_key: &str,
        app_url: &str,
    ) -> Result<Self, Error> {
        Url::parse(supabase_url)?;
        Url::parse(app_url)?;
        if anon_key.is_empty() {
            return Err(Error::config("anon key cannot be empty"));
        }
        if service_role_key.is_empty() {
            return Err(Error::config("service role key cannot be empty"));
        }

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            service_role_key: service_role_key.to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
            options: ClientOptions::default(),
        })
    }

    /// Load the configuration from the environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, Error> {
        dotenvy::dotenv().ok();

        let supabase_url = env_var(&["NEXT_PUBLIC_SUPABASE_URL", "SUPABASE_URL"])?;
        let anon_key = env_var(&["NEXT_PUBLIC_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"])?;
        let service_role_key = env_var(&["SUPABASE_SERVICE_ROLE_KEY"])?;
        let app_url = env_var(&["NEXT_PUBLIC_APP_URL", "APP_URL"])?;

        Self::new(&supabase_url, &anon_key, &service_role_key, &app_url)
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Where password-reset emails send the user back to
    pub fn password_reset_redirect(&self) -> String {
        format!("{}/reset-password", self.app_url)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("supabase_url", &self.supabase_url)
            .field("anon_key", &"[redacted]")
            .field("service_role_key", &"[redacted]")
            .field("app_url", &self.app_url)
            .field("options", &self.options)
            .finish()
    }
}

fn env_var(names: &[&str]) -> Result<String, Error> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| Error::config(format!("{} environment variable not found", names.join(" / "))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes() {
        let config = AppConfig::new(
            "https://project.supabase.co/",
            "anon",
            "service",
            "https://admin.example.com/",
        )
        .unwrap();
        assert_eq!(config.supabase_url, "https://project.supabase.co");
        assert_eq!(
            config.password_reset_redirect(),
            "https://admin.example.com/reset-password"
        );
    }

    #[test]
    fn rejects_bad_url_and_empty_keys() {
        assert!(AppConfig::new("not a url", "anon", "service", "https://a.b").is_err());
        assert!(matches!(
            AppConfig::new("https://p.supabase.co", "", "service", "https://a.b"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::new("https://p.supabase.co", "anon", "", "https://a.b"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn debug_redacts_keys() {
        let config =
            AppConfig::new("https://p.supabase.co", "anon-secret", "service-secret", "https://a.b")
                .unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("anon-secret"));
        assert!(!printed.contains("service-secret"));
        assert!(printed.contains("https://p.supabase.co"));
    }
}
