//! Cookie-token sessions.
//!
//! Each session holds the admin-logged-in flag and the JSON API's cart
//! mirror. The mirror is intentionally independent of the client-persisted
//! cart; it backs only the `/carrito/api/*` surface and the `cartCount`
//! view global. Cookies are parsed and emitted by hand.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "tienda_sid";

/// Upper bound on live sessions; past it, an arbitrary session is evicted
/// before a new one is created so cookieless traffic cannot grow the map
/// without limit.
const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionCartItem {
    pub id: String,
    pub cantidad: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub admin_logged_in: bool,
    pub admin_user: Option<String>,
    pub cart: Vec<SessionCartItem>,
}

impl Session {
    /// Displayed cart count: the sum of quantities.
    pub fn cart_count(&self) -> i64 {
        self.cart.iter().map(|item| item.cantidad).sum()
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    counter: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the request's session, creating one when the cookie is
    /// missing or stale. Returns the token to echo back in `Set-Cookie`.
    pub fn resolve(&self, headers: &HeaderMap) -> (String, Session) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");

        if let Some(token) = cookie_value(headers, SESSION_COOKIE) {
            if let Some(session) = sessions.get(&token) {
                return (token, session.clone());
            }
        }

        if sessions.len() >= MAX_SESSIONS {
            if let Some(stale) = sessions.keys().next().cloned() {
                sessions.remove(&stale);
            }
        }

        let token = self.new_token();
        sessions.insert(token.clone(), Session::default());
        (token, Session::default())
    }

    pub fn update<F>(&self, token: &str, mutate: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        let session = sessions.entry(token.to_string()).or_default();
        mutate(session);
        session.clone()
    }

    pub fn destroy(&self, token: &str) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.remove(token);
    }

    /// `RandomState` seeds each hasher from OS entropy, so tokens are not
    /// derivable from the clock and counter alone.
    fn new_token(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let count = self.counter.fetch_add(1, Ordering::Relaxed);

        let mut hasher = RandomState::new().build_hasher();
        nanos.hash(&mut hasher);
        count.hash(&mut hasher);
        std::process::id().hash(&mut hasher);
        let high = hasher.finish();

        let mut hasher = RandomState::new().build_hasher();
        high.hash(&mut hasher);
        nanos.hash(&mut hasher);
        format!("{high:016x}{:016x}", hasher.finish())
    }
}

/// `Set-Cookie` value for the session token.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly")
}

/// Expired cookie used on logout.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0")
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (cookie_name, value) = trimmed
            .split_once('=')
            .map(|(n, v)| (n.trim(), v.trim()))
            .unwrap_or((trimmed, ""));
        if cookie_name == name {
            return Some(value.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(raw).expect("cookie"));
        headers
    }

    #[test]
    fn test_cookie_parsing() {
        let headers = headers_with_cookie("a=1; tienda_sid=abc123 ; otro=x");
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE),
            Some("abc123".to_string())
        );
        assert_eq!(cookie_value(&headers, "otro"), Some("x".to_string()));
        assert_eq!(cookie_value(&headers, "nada"), None);
    }

    #[test]
    fn test_resolve_creates_then_reuses_session() {
        let store = SessionStore::new();
        let (token, session) = store.resolve(&HeaderMap::new());
        assert!(!session.admin_logged_in);

        store.update(&token, |s| s.admin_logged_in = true);

        let headers = headers_with_cookie(&session_cookie(&token));
        let (resolved, session) = store.resolve(&headers);
        assert_eq!(resolved, token);
        assert!(session.admin_logged_in);
    }

    #[test]
    fn test_stale_cookie_gets_fresh_session() {
        let store = SessionStore::new();
        let headers = headers_with_cookie("tienda_sid=desconocido");
        let (token, session) = store.resolve(&headers);
        assert_ne!(token, "desconocido");
        assert!(session.cart.is_empty());
    }

    #[test]
    fn test_destroy_removes_session() {
        let store = SessionStore::new();
        let (token, _) = store.resolve(&HeaderMap::new());
        store.update(&token, |s| s.admin_logged_in = true);
        store.destroy(&token);

        let headers = headers_with_cookie(&session_cookie(&token));
        let (_, session) = store.resolve(&headers);
        assert!(!session.admin_logged_in);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = SessionStore::new();
        let (a, _) = store.resolve(&HeaderMap::new());
        let (b, _) = store.resolve(&HeaderMap::new());
        assert_ne!(a, b);
    }

    #[test]
    fn test_store_evicts_at_capacity() {
        let store = SessionStore::new();
        for _ in 0..(MAX_SESSIONS + 5) {
            store.resolve(&HeaderMap::new());
        }
        let sessions = store.sessions.lock().expect("session lock poisoned");
        assert!(sessions.len() <= MAX_SESSIONS);
    }

    #[test]
    fn test_cart_count_sums_quantities() {
        let session = Session {
            cart: vec![
                SessionCartItem {
                    id: "1".to_string(),
                    cantidad: 2,
                },
                SessionCartItem {
                    id: "2".to_string(),
                    cantidad: 3,
                },
            ],
            ..Default::default()
        };
        assert_eq!(session.cart_count(), 5);
    }
}
