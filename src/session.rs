use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::db::{KeyValueStore, StorageResult};
use crate::models::Admin;

pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Restoring,
    Authenticated { admin: Admin, verified: bool },
}

type ExpiryListener = Arc<dyn Fn() + Send + Sync>;

/// A session restored from a stored token is trusted without asking the
/// backend and stays `verified: false` until the first denied request.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<SessionState>,
    on_expired: Mutex<Vec<ExpiryListener>>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: Mutex::new(SessionState::Unauthenticated),
            on_expired: Mutex::new(Vec::new()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: SessionState) {
        *self.lock_state() = next;
    }

    /// Restores the session from storage. Call once at startup.
    pub fn init(&self) -> StorageResult<SessionState> {
        self.set_state(SessionState::Restoring);

        let next = match self.stored_token()? {
            Some(_) => {
                warn!("Restored admin session from stored token without server verification");
                SessionState::Authenticated {
                    admin: Admin::placeholder(),
                    verified: false,
                }
            }
            None => SessionState::Unauthenticated,
        };

        self.set_state(next.clone());
        Ok(next)
    }

    /// Drops the in-memory identity but keeps the stored token, so the next
    /// `init` restores it.
    pub fn teardown(&self) {
        self.set_state(SessionState::Unauthenticated);
    }

    /// Adds a callback fired when the backend rejects the credentials.
    pub fn on_expired<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lock_listeners().push(Arc::new(listener));
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<ExpiryListener>> {
        self.on_expired
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.lock_state(), SessionState::Authenticated { .. })
    }

    pub fn admin(&self) -> Option<Admin> {
        match &*self.lock_state() {
            SessionState::Authenticated { admin, .. } => Some(admin.clone()),
            _ => None,
        }
    }

    fn stored_token(&self) -> StorageResult<Option<String>> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn token(&self) -> Option<String> {
        self.stored_token().unwrap_or_else(|e| {
            warn!("Failed to read stored token: {e}");
            None
        })
    }

    /// Persists the token and marks the session authenticated after a login.
    pub fn establish(&self, token: &str, admin: Option<Admin>) -> StorageResult<Admin> {
        self.store.set(TOKEN_KEY, token)?;

        let admin = admin.unwrap_or_else(Admin::placeholder);
        info!("Admin {} logged in", admin.username);

        self.set_state(SessionState::Authenticated {
            admin: admin.clone(),
            verified: true,
        });

        Ok(admin)
    }

    pub fn logout(&self) -> StorageResult<()> {
        self.set_state(SessionState::Unauthenticated);
        self.store.remove(TOKEN_KEY)?;
        info!("Admin logged out");
        Ok(())
    }

    /// Reaction to an authorization-denied response: clear everything and
    /// signal the login entry point.
    pub fn handle_unauthorized(&self) {
        warn!("Authorization denied by backend, clearing session");

        self.set_state(SessionState::Unauthenticated);
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!("Failed to clear stored token: {e}");
        }

        // Listeners may register others or hit another 401
        let listeners = self.lock_listeners().clone();
        for notify in listeners {
            notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session_with(token: Option<&str>) -> (Arc<MemoryStore>, Session) {
        let store = Arc::new(MemoryStore::new());
        if let Some(token) = token {
            store.set(TOKEN_KEY, token).unwrap();
        }
        let session = Session::new(store.clone());
        (store, session)
    }

    #[test]
    fn test_init_without_token() {
        let (_, session) = session_with(None);

        assert_eq!(session.init().unwrap(), SessionState::Unauthenticated);
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_init_with_stored_token_is_unverified() {
        let (_, session) = session_with(Some("stored"));

        let state = session.init().unwrap();

        assert_eq!(
            state,
            SessionState::Authenticated {
                admin: Admin::placeholder(),
                verified: false,
            }
        );
        assert_eq!(session.token().as_deref(), Some("stored"));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let (_, session) = session_with(Some("  "));
        assert_eq!(session.init().unwrap(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_establish_and_logout() {
        let (store, session) = session_with(None);
        session.init().unwrap();

        let admin = Admin {
            id: 3,
            username: "chef".to_string(),
            email: Some("chef@example.com".to_string()),
        };
        session.establish("tok-1", Some(admin.clone())).unwrap();

        assert_eq!(session.admin(), Some(admin));
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));

        session.logout().unwrap();
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_teardown_keeps_token_for_next_start() {
        let (_, session) = session_with(None);
        session.establish("tok-2", None).unwrap();

        session.teardown();
        assert!(!session.is_authenticated());

        assert!(matches!(
            session.init().unwrap(),
            SessionState::Authenticated { verified: false, .. }
        ));
    }

    #[test]
    fn test_unauthorized_clears_and_notifies() {
        let (store, session) = session_with(Some("expired"));
        session.init().unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        session.on_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.handle_unauthorized();

        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listeners_may_reenter_session() {
        let (_, session) = session_with(Some("expired"));
        let session = Arc::new(session);
        session.init().unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let inner = session.clone();
        let counter = fired.clone();
        session.on_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            inner.on_expired(|| {});
        });
        let counter = fired.clone();
        session.on_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.handle_unauthorized();
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        session.handle_unauthorized();
        assert_eq!(fired.load(Ordering::SeqCst), 4);
    }
}
