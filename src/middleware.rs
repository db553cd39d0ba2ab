//! Session resolution and role-based routing for the web application.
//!
//! The browser carries its session in the `sb-<project-ref>-auth-token`
//! cookie written by the Supabase SSR helpers. Large sessions are split
//! into `.0`, `.1`, ... chunks and newer helpers prefix the value with
//! `base64-`. Only the token claims are read here; the auth API verifies
//! the signature whenever an action resolves the caller.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::Session;
use crate::models::{tables, Role};
use crate::Backend;

/// Routes reachable without a session
pub const PUBLIC_ROUTES: [&str; 2] = ["/login", "/"];

const LOGIN: &str = "/login";
const AUTH_COOKIE_SUFFIX: &str = "-auth-token";
const BARE_TOKEN_COOKIE: &str = "sb-access-token";
const BASE64_PREFIX: &str = "base64-";

/// What to do with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Continue,
    Redirect(&'static str),
}

/// Decide where a request for `path` goes.
///
/// `role` is the stored role of the session's user and is ignored when
/// there is no session.
pub fn route_access(path: &str, session: Option<&Session>, role: Option<Role>) -> RouteDecision {
    if session.is_none() {
        if PUBLIC_ROUTES.contains(&path) {
            return RouteDecision::Continue;
        }
        return RouteDecision::Redirect(LOGIN);
    }

    if path == LOGIN {
        if let Some(role) = role {
            return RouteDecision::Redirect(role.home_path());
        }
    }

    if path.starts_with(Role::Admin.home_path()) && role != Some(Role::Admin) {
        return RouteDecision::Redirect(Role::Promotora.home_path());
    }
    if path.starts_with(Role::Promotora.home_path()) && role != Some(Role::Promotora) {
        return RouteDecision::Redirect(Role::Admin.home_path());
    }

    RouteDecision::Continue
}

/// Split a `Cookie` header into name/value pairs
pub fn parse_cookies(header: &str) -> Vec<(&str, &str)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim(), value.trim()))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Reassemble the auth cookie, joining chunks in index order
fn auth_cookie_value(cookies: &[(&str, &str)]) -> Option<String> {
    if let Some((_, value)) = cookies
        .iter()
        .find(|(name, _)| name.starts_with("sb-") && name.ends_with(AUTH_COOKIE_SUFFIX))
    {
        return Some(value.to_string());
    }

    let mut chunks: Vec<(usize, &str)> = cookies
        .iter()
        .filter_map(|(name, value)| {
            let (base, index) = name.rsplit_once('.')?;
            if !(base.starts_with("sb-") && base.ends_with(AUTH_COOKIE_SUFFIX)) {
                return None;
            }
            Some((index.parse().ok()?, *value))
        })
        .collect();
    if chunks.is_empty() {
        return None;
    }
    chunks.sort_by_key(|(index, _)| *index);
    Some(chunks.into_iter().map(|(_, value)| value).collect())
}

fn decode_cookie_value(raw: &str) -> Option<String> {
    let value = urlencoding::decode(raw).ok()?.into_owned();
    match value.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => {
            let bytes = URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')).ok()?;
            String::from_utf8(bytes).ok()
        }
        None => Some(value),
    }
}

/// Session stored as JSON: the current object form or the older
/// `[access_token, refresh_token, ...]` array
fn session_from_json(json: &str) -> Option<Session> {
    match serde_json::from_str::<Value>(json).ok()? {
        Value::Object(map) => Session::deserialize(Value::Object(map)).ok(),
        Value::Array(items) => {
            let token = items.first()?.as_str()?;
            let mut session = Session::from_access_token(token).ok()?;
            if let Some(refresh) = items.get(1).and_then(Value::as_str) {
                session.refresh_token = refresh.to_string();
            }
            Some(session)
        }
        _ => None,
    }
}

/// Session carried by a request's `Cookie` header.
///
/// Expired or unreadable sessions count as absent.
pub fn session_from_cookie_header(header: &str) -> Option<Session> {
    let cookies = parse_cookies(header);

    let session = match auth_cookie_value(&cookies) {
        Some(raw) => {
            let value = decode_cookie_value(&raw)?;
            session_from_json(&value).or_else(|| Session::from_access_token(&value).ok())
        }
        None => cookies
            .iter()
            .find(|(name, _)| *name == BARE_TOKEN_COOKIE)
            .and_then(|(_, token)| Session::from_access_token(token).ok()),
    }?;

    if session.is_expired() {
        tracing::debug!("ignoring expired session cookie");
        return None;
    }
    Some(session)
}

#[derive(Deserialize)]
struct RoleRow {
    role: String,
}

/// Applies [`route_access`] to incoming requests, looking up the role of
/// the signed-in user with the user's own token.
pub struct RouteGate {
    backend: Backend,
}

impl RouteGate {
    /// `backend` should hold the anon key so row level security applies
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn check(&self, path: &str, cookie_header: Option<&str>) -> RouteDecision {
        let session = cookie_header.and_then(session_from_cookie_header);
        let role = match &session {
            Some(session) => self.role_of(session).await,
            None => None,
        };
        let decision = route_access(path, session.as_ref(), role);
        tracing::debug!(path, ?role, ?decision, "route checked");
        decision
    }

    async fn role_of(&self, session: &Session) -> Option<Role> {
        let user_id = session.user_id().ok()?;
        let row = self
            .backend
            .from(tables::PROFILES)
            .with_auth(&session.access_token)
            .select("role")
            .eq("id", user_id)
            .maybe_single::<RoleRow>()
            .await;

        match row {
            Ok(row) => row.and_then(|r| r.role.parse().ok()),
            Err(e) => {
                tracing::debug!(%user_id, error = %e, "role lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use uuid::Uuid;

    fn token(exp_offset: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + exp_offset;
        let claims = json!({
            "sub": Uuid::new_v4(),
            "exp": exp,
            "email": "admin@example.com",
            "role": "authenticated"
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test")).unwrap()
    }

    fn session() -> Session {
        Session::from_access_token(&token(3600)).unwrap()
    }

    #[test]
    fn unauthenticated_requests_only_reach_public_routes() {
        assert_eq!(route_access("/", None, None), RouteDecision::Continue);
        assert_eq!(route_access("/login", None, None), RouteDecision::Continue);
        assert_eq!(
            route_access("/admin/products", None, Some(Role::Admin)),
            RouteDecision::Redirect("/login")
        );
    }

    #[test]
    fn login_sends_users_home() {
        let s = session();
        assert_eq!(
            route_access("/login", Some(&s), Some(Role::Admin)),
            RouteDecision::Redirect("/admin")
        );
        assert_eq!(
            route_access("/login", Some(&s), Some(Role::Promotora)),
            RouteDecision::Redirect("/promotora")
        );
        assert_eq!(route_access("/login", Some(&s), None), RouteDecision::Continue);
    }

    #[test]
    fn areas_are_reserved_to_their_role() {
        let s = session();
        assert_eq!(
            route_access("/admin/users", Some(&s), Some(Role::Promotora)),
            RouteDecision::Redirect("/promotora")
        );
        assert_eq!(
            route_access("/promotora", Some(&s), Some(Role::Admin)),
            RouteDecision::Redirect("/admin")
        );
        assert_eq!(
            route_access("/admin", Some(&s), None),
            RouteDecision::Redirect("/promotora")
        );
        assert_eq!(
            route_access("/admin/stores", Some(&s), Some(Role::Admin)),
            RouteDecision::Continue
        );
    }

    #[test]
    fn reads_plain_json_cookie() {
        let access = token(3600);
        let value = json!({ "access_token": access, "refresh_token": "r1" }).to_string();
        let header = format!(
            "theme=dark; sb-abcd-auth-token={}",
            urlencoding::encode(&value)
        );
        let session = session_from_cookie_header(&header).unwrap();
        assert_eq!(session.access_token, access);
        assert_eq!(session.refresh_token, "r1");
    }

    #[test]
    fn reads_chunked_base64_cookie() {
        let access = token(3600);
        let value = json!({ "access_token": access }).to_string();
        let encoded = format!("{}{}", BASE64_PREFIX, URL_SAFE_NO_PAD.encode(value));
        let (first, second) = encoded.split_at(encoded.len() / 2);
        let header = format!(
            "sb-abcd-auth-token.1={}; sb-abcd-auth-token.0={}",
            second, first
        );
        let session = session_from_cookie_header(&header).unwrap();
        assert_eq!(session.access_token, access);
    }

    #[test]
    fn reads_legacy_array_and_bare_token() {
        let access = token(3600);
        let value = json!([access, "refresh", null, null, null]).to_string();
        let header = format!("sb-abcd-auth-token={}", urlencoding::encode(&value));
        let session = session_from_cookie_header(&header).unwrap();
        assert_eq!(session.refresh_token, "refresh");

        let header = format!("sb-access-token={}", access);
        assert!(session_from_cookie_header(&header).is_some());
    }

    #[test]
    fn expired_or_garbage_cookies_are_no_session() {
        let header = format!("sb-access-token={}", token(-60));
        assert!(session_from_cookie_header(&header).is_none());
        assert!(session_from_cookie_header("sb-abcd-auth-token=not-json").is_none());
        assert!(session_from_cookie_header("").is_none());
    }

    #[test]
    fn gate_without_cookie_skips_role_lookup() {
        // Nothing listens here; no request is made without a session.
        let backend = Backend::new("http://127.0.0.1:9", "anon").unwrap();
        let gate = RouteGate::new(backend);

        tokio_test::block_on(async {
            assert_eq!(gate.check("/login", None).await, RouteDecision::Continue);
            assert_eq!(
                gate.check("/admin/stores", Some("theme=dark")).await,
                RouteDecision::Redirect("/login")
            );
        });
    }
}
