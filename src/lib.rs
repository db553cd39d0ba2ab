//! Inventory and user administration for FC Falabella stores.
//!
//! The crate is a thin layer of business rules over a hosted Supabase
//! project: a small REST/auth client ([`Backend`]), validation schemas for
//! stores, products and users, an admin authorization guard, and the action
//! layer that combines them.

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod postgrest;
pub mod validation;

use reqwest::Client;

use crate::auth::Auth;
use crate::config::{AppConfig, ClientOptions};
use crate::error::Error;
use crate::postgrest::PostgrestClient;

/// Client for one Supabase project, bound to a single API key.
///
/// Build one with the service-role key for server-side actions and, when
/// needed, another with the anon key for requests made on behalf of users.
pub struct Backend {
    /// The base URL for the project
    pub url: String,
    /// The API key used for every request
    key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for user management and authentication
    auth: Auth,
    /// Client options
    pub options: ClientOptions,
}

impl Backend {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use fc_inventory_admin::Backend;
    ///
    /// let backend = Backend::new("https://your-project.supabase.co", "your-anon-key").unwrap();
    /// let stores = backend.from("stores");
    /// ```
    pub fn new(url: &str, key: &str) -> Result<Self, Error> {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Result<Self, Error> {
        url::Url::parse(url)?;
        let url = url.trim_end_matches('/');

        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Auth::new(url, key, http_client.clone(), options.clone());

        Ok(Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            auth,
            options,
        })
    }

    /// Server-side client holding the service-role key
    pub fn service_role(config: &AppConfig) -> Result<Self, Error> {
        Self::new_with_options(
            &config.supabase_url,
            &config.service_role_key,
            config.options.clone(),
        )
    }

    /// Client holding the public anon key
    pub fn anon(config: &AppConfig) -> Result<Self, Error> {
        Self::new_with_options(&config.supabase_url, &config.anon_key, config.options.clone())
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Start a query against a table or view
    pub fn from(&self, table: &str) -> PostgrestClient {
        PostgrestClient::new(
            &self.url,
            &self.key,
            table,
            self.http_client.clone(),
            self.options.clone(),
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::actions::{ActionError, AdminService, Caller};
    pub use crate::config::{AppConfig, ClientOptions};
    pub use crate::error::Error;
    pub use crate::models::Role;
    pub use crate::validation::{FieldErrors, Schema};
    pub use crate::Backend;
}
