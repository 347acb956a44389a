//! Explicit sign-in session
//!
//! Ownership columns of a new template come from the session passed to
//! the save, never from ambient state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(email: impl Into<String>, full_name: Option<String>, access_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            full_name,
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Value stamped into the template's `author` column
    pub fn author(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Holder of the current session for embedding hosts
#[derive(Debug, Default)]
pub struct SessionContext {
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: RwLock::new(Some(session)),
        }
    }

    pub fn login(&self, session: Session) {
        log::info!("Signed in as {}", session.email);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Clear the session, returning the one that was active
    pub fn logout(&self) -> Option<Session> {
        let previous = self.current.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(session) = &previous {
            log::info!("Signed out {}", session.email);
        }
        previous
    }

    /// The active session; expired sessions are treated as absent
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|session| !session.is_expired())
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_author_falls_back_to_email() {
        let named = Session::new("ann@example.com", Some("Ann Lee".to_string()), "t");
        assert_eq!(named.author(), "Ann Lee");

        let blank = Session::new("ann@example.com", Some("  ".to_string()), "t");
        assert_eq!(blank.author(), "ann@example.com");
    }

    #[test]
    fn test_login_logout() {
        let context = SessionContext::new();
        assert!(!context.is_signed_in());

        context.login(Session::new("ann@example.com", None, "t"));
        assert_eq!(context.current().unwrap().email, "ann@example.com");

        let previous = context.logout();
        assert!(previous.is_some());
        assert!(context.current().is_none());
    }

    #[test]
    fn test_expired_session_is_not_current() {
        let mut session = Session::new("ann@example.com", None, "t");
        session.expires_at = Some(Utc::now() - Duration::minutes(1));

        let context = SessionContext::with_session(session);
        assert!(context.current().is_none());
    }
}
