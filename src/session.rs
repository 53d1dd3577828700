//! Cookie sessions, flash messages and saved form data.
//!
//! Session state is never global: handlers receive a [`Session`] handle via
//! request extensions, and the handle talks to the [`SessionStore`] the
//! application was built with.

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::security::random_token;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "site_session";

/// Field name -> submitted value, kept for re-populating a form.
pub type FormData = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot messages shown on the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashMessages {
    pub success: Vec<String>,
    pub error: Vec<String>,
}

impl FlashMessages {
    pub fn push(&mut self, kind: FlashKind, message: String) {
        match kind {
            FlashKind::Success => self.success.push(message),
            FlashKind::Error => self.error.push(message),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

/// Everything stored for one visitor.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub flash: FlashMessages,
    pub form_data: FormData,
    pub csrf_token: String,
    last_seen: Instant,
}

impl SessionData {
    fn new() -> Self {
        Self {
            flash: FlashMessages::default(),
            form_data: FormData::new(),
            csrf_token: random_token(),
            last_seen: Instant::now(),
        }
    }
}

/// Storage backend for sessions.
pub trait SessionStore: Send + Sync {
    /// Start a new session and return its id.
    fn create(&self) -> String;

    /// Mark a session as used. Returns `false` if it is unknown or expired.
    fn touch(&self, id: &str) -> bool;

    /// Run `f` against the session's data, starting a fresh record if the
    /// session vanished in the meantime.
    fn modify(&self, id: &str, f: &mut dyn FnMut(&mut SessionData));
}

/// In-process session store with idle expiry.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionData>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionData>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self) -> String {
        let mut sessions = self.lock();

        let before = sessions.len();
        sessions.retain(|_, data| data.last_seen.elapsed() < self.ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Expired {} idle sessions", expired);
        }

        let id = random_token();
        sessions.insert(id.clone(), SessionData::new());
        id
    }

    fn touch(&self, id: &str) -> bool {
        let mut sessions = self.lock();
        let Some(data) = sessions.get_mut(id) else {
            return false;
        };

        if data.last_seen.elapsed() < self.ttl {
            data.last_seen = Instant::now();
            return true;
        }

        sessions.remove(id);
        false
    }

    fn modify(&self, id: &str, f: &mut dyn FnMut(&mut SessionData)) {
        let mut sessions = self.lock();
        let data = sessions
            .entry(id.to_string())
            .or_insert_with(SessionData::new);
        f(data);
    }
}

/// Per-request handle to the visitor's session.
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(id: String, store: Arc<dyn SessionStore>) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&self, kind: FlashKind, message: impl Into<String>) {
        let message = message.into();
        self.with(|data| data.flash.push(kind, message.clone()));
    }

    /// Take and clear all queued flash messages.
    pub fn take_flash(&self) -> FlashMessages {
        self.with(|data| std::mem::take(&mut data.flash))
    }

    pub fn set_form_data(&self, form: FormData) {
        self.with(|data| data.form_data = form.clone());
    }

    /// Take and clear saved form data.
    pub fn take_form_data(&self) -> FormData {
        self.with(|data| std::mem::take(&mut data.form_data))
    }

    pub fn csrf_token(&self) -> String {
        self.with(|data| data.csrf_token.clone())
    }

    fn with<T: Default>(&self, mut f: impl FnMut(&mut SessionData) -> T) -> T {
        let mut out = None;
        self.store
            .modify(&self.id, &mut |data: &mut SessionData| out = Some(f(data)));
        out.unwrap_or_default()
    }
}

/// Middleware attaching a [`Session`] to every request.
///
/// Reuses the session named by the cookie when it is still alive, otherwise
/// starts a new one and sets the cookie on the response.
pub async fn attach_session(
    State(store): State<Arc<dyn SessionStore>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = cookie_value(request.headers(), SESSION_COOKIE).filter(|id| store.touch(id));

    let (id, is_new) = match existing {
        Some(id) => (id, false),
        None => (store.create(), true),
    };

    request
        .extensions_mut()
        .insert(Session::new(id.clone(), Arc::clone(&store)));

    let mut response = next.run(request).await;

    if is_new {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!("Failed to build session cookie: {}", e),
        }
    }

    response
}

/// Value of the cookie called `name`, if the request carries one.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (Session, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new(Duration::from_secs(60)));
        let id = store.create();
        (Session::new(id, store.clone()), store)
    }

    // ==================== Flash Tests ====================

    #[test]
    fn test_flash_is_taken_once() {
        let (session, _) = session();
        session.flash(FlashKind::Error, "Name is required.");
        session.flash(FlashKind::Error, "Message is required.");
        session.flash(FlashKind::Success, "Sent");

        let flash = session.take_flash();
        assert_eq!(flash.error, vec!["Name is required.", "Message is required."]);
        assert_eq!(flash.success, vec!["Sent"]);

        assert!(session.take_flash().is_empty());
    }

    #[test]
    fn test_form_data_is_taken_once() {
        let (session, _) = session();
        let mut form = FormData::new();
        form.insert("name".to_string(), "Ana".to_string());
        session.set_form_data(form.clone());

        assert_eq!(session.take_form_data(), form);
        assert!(session.take_form_data().is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = Arc::new(MemorySessionStore::new(Duration::from_secs(60)));
        let a = Session::new(store.create(), store.clone());
        let b = Session::new(store.create(), store.clone());

        a.flash(FlashKind::Success, "only for a");

        assert!(b.take_flash().is_empty());
        assert_eq!(a.take_flash().success, vec!["only for a"]);
        assert_ne!(a.csrf_token(), b.csrf_token());
    }

    #[test]
    fn test_csrf_token_is_stable_within_session() {
        let (session, _) = session();
        assert_eq!(session.csrf_token(), session.csrf_token());
    }

    // ==================== Store Tests ====================

    #[test]
    fn test_touch_unknown_session() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        assert!(!store.touch("missing"));
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = MemorySessionStore::new(Duration::ZERO);
        let id = store.create();
        assert!(!store.touch(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_purges_expired_sessions() {
        let store = MemorySessionStore::new(Duration::ZERO);
        store.create();
        store.create();
        assert_eq!(store.len(), 1);
    }

    // ==================== Cookie Tests ====================

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; site_session=abc123; other=1"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc123".to_string()));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("site_session=xyz"));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("xyz".to_string()));
    }
}
