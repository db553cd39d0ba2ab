//! Server-side admin actions.
//!
//! Every mutation runs the same pipeline: authenticate the caller, require
//! the admin role, validate the input, run the uniqueness or dependency
//! pre-checks, write, and finally notify the [`Revalidate`] hook. Reads are
//! not gated. All backend calls go through the service-role client.

mod error;
mod guard;
mod products;
mod stores;
mod users;

use std::fmt;
use std::sync::Arc;

pub use error::ActionError;
pub use guard::{AdminAction, AdminGuard};
pub use products::Products;
pub use stores::Stores;
pub use users::Users;

use crate::auth::Session;
use crate::config::AppConfig;
use crate::error::Error;
use crate::middleware;
use crate::Backend;

/// Admin page listing products
pub const PRODUCTS_PATH: &str = "/admin/products";
/// Admin page listing users
pub const USERS_PATH: &str = "/admin/users";
/// Admin page listing stores
pub const STORES_PATH: &str = "/admin/stores";

/// Told which admin page went stale after a successful mutation
pub trait Revalidate: Send + Sync {
    fn revalidate(&self, path: &str);
}

impl<F> Revalidate for F
where
    F: Fn(&str) + Send + Sync,
{
    fn revalidate(&self, path: &str) {
        self(path)
    }
}

/// Hook that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevalidate;

impl Revalidate for NoRevalidate {
    fn revalidate(&self, _path: &str) {}
}

/// Whoever invokes an action, identified by their access token
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Caller {
    access_token: Option<String>,
}

impl Caller {
    /// A caller without a session
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
        }
    }

    pub fn from_session(session: &Session) -> Self {
        Self::bearer(session.access_token.clone())
    }

    /// Caller behind a request's `Cookie` header
    pub fn from_cookie_header(header: &str) -> Self {
        middleware::session_from_cookie_header(header)
            .map(|s| Self::from_session(&s))
            .unwrap_or_default()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

/// Entry point of the action layer
pub struct AdminService {
    backend: Backend,
    config: AppConfig,
    revalidate: Arc<dyn Revalidate>,
}

impl AdminService {
    /// Build the service with a service-role client for `config`
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let backend = Backend::service_role(&config)?;
        Ok(Self {
            backend,
            config,
            revalidate: Arc::new(NoRevalidate),
        })
    }

    /// Install the hook notified after each successful mutation
    pub fn with_revalidate(mut self, revalidate: impl Revalidate + 'static) -> Self {
        self.revalidate = Arc::new(revalidate);
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn guard(&self) -> AdminGuard<'_> {
        AdminGuard::new(&self.backend)
    }

    pub fn products(&self) -> Products<'_> {
        Products::new(self)
    }

    pub fn stores(&self) -> Stores<'_> {
        Stores::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub(crate) fn revalidate(&self, path: &str) {
        self.revalidate.revalidate(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn config() -> AppConfig {
        AppConfig::new(
            "http://localhost:54321",
            "anon-key",
            "service-key",
            "http://localhost:3000",
        )
        .unwrap()
    }

    #[test]
    fn closures_work_as_revalidate_hooks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let service = AdminService::new(config())
            .unwrap()
            .with_revalidate(move |path: &str| sink.lock().unwrap().push(path.to_string()));

        service.revalidate(STORES_PATH);
        assert_eq!(*seen.lock().unwrap(), vec![STORES_PATH.to_string()]);
    }

    #[test]
    fn caller_debug_hides_the_token() {
        let caller = Caller::bearer("secret-token");
        assert_eq!(caller.access_token(), Some("secret-token"));
        assert!(!format!("{:?}", caller).contains("secret-token"));
        assert_eq!(Caller::anonymous().access_token(), None);
        assert_eq!(Caller::from_cookie_header("theme=dark"), Caller::anonymous());
    }
}
