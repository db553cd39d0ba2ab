//! Authentication and user management

mod session;
mod types;

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Client;
use serde_json::json;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};

pub use session::*;
pub use types::*;

/// Client for the authentication API
pub struct Auth {
    /// The base URL for the project
    url: String,

    /// The API key (anon or service role)
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The session signed in through this client, if any
    session: Arc<Mutex<Option<Session>>>,

    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn request<'a>(&'a self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch
            .header("apikey", &self.key)
            .timeout(self.options.request_timeout)
    }

    /// Sign in a user with email and password and keep the session
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let url = self.get_auth_url("/token");

        let session = self
            .request(Fetch::post(&self.client, &url))
            .query_pair("grant_type", "password")
            .json(&PasswordCredentials { email, password })?
            .execute::<Session>()
            .await?;

        self.set_session(session.clone());
        Ok(session)
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");

        let token = match self.get_session() {
            Some(session) => session.access_token,
            None => return Err(Error::auth("Not logged in")),
        };

        self.request(Fetch::post(&self.client, &url))
            .bearer_auth(&token)
            .execute_raw()
            .await?;

        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    /// Resolve the user behind an access token.
    ///
    /// Unlike [`Session::claims`], this asks the auth API, so revoked or forged
    /// tokens are rejected.
    pub async fn get_user(&self, access_token: &str) -> Result<User, Error> {
        let url = self.get_auth_url("/user");

        self.request(Fetch::get(&self.client, &url))
            .bearer_auth(access_token)
            .execute::<User>()
            .await
    }

    /// Send a password-reset email
    pub async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), Error> {
        let url = self.get_auth_url("/recover");

        let mut fetch = self.request(Fetch::post(&self.client, &url));
        if let Some(redirect_to) = redirect_to {
            fetch = fetch.query_pair("redirect_to", redirect_to);
        }

        fetch
            .json(&json!({ "email": email }))?
            .execute_raw()
            .await
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set the session
    pub fn set_session(&self, session: Session) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// User administration; requires the client to hold the service-role key
    pub fn admin(&self) -> AdminAuth<'_> {
        AdminAuth { auth: self }
    }
}

/// Admin endpoints of the authentication API
pub struct AdminAuth<'a> {
    auth: &'a Auth,
}

impl AdminAuth<'_> {
    fn users_url(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => self.auth.get_auth_url(&format!("/admin/users/{}", id)),
            None => self.auth.get_auth_url("/admin/users"),
        }
    }

    fn request<'b>(&'b self, fetch: FetchBuilder<'b>) -> FetchBuilder<'b> {
        self.auth.request(fetch).bearer_auth(&self.auth.key)
    }

    /// Create an identity
    pub async fn create_user(&self, attributes: &AdminUserAttributes) -> Result<User, Error> {
        let url = self.users_url(None);

        self.request(Fetch::post(&self.auth.client, &url))
            .json(attributes)?
            .execute::<User>()
            .await
    }

    /// Update an identity
    pub async fn update_user_by_id(
        &self,
        id: &str,
        attributes: &AdminUserAttributes,
    ) -> Result<User, Error> {
        let url = self.users_url(Some(id));

        self.request(Fetch::put(&self.auth.client, &url))
            .json(attributes)?
            .execute::<User>()
            .await
    }

    /// Delete an identity
    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        let url = self.users_url(Some(id));

        self.request(Fetch::delete(&self.auth.client, &url))
            .execute_raw()
            .await
    }
}
