//! Explicit store session.
//!
//! Every gateway call receives a `&Session`. A session starts `Pending`,
//! becomes `Ready` once a token is available, and ends `Revoked` on sign-out.
//! An initialization failure is terminal: build a new session to retry.

use crate::error::{LedgerError, Result};
use parking_lot::RwLock;
use std::fmt;

/// Bearer credential handed to the store. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Lifecycle of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Ready(AccessToken),
    Failed(String),
    Revoked,
}

/// Store session shared by reference between the ledger and its gateway.
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// A session still waiting for credentials.
    pub fn pending() -> Self {
        Self {
            state: RwLock::new(SessionState::Pending),
        }
    }

    /// A session that is ready immediately.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            state: RwLock::new(SessionState::Ready(token)),
        }
    }

    /// Complete initialization. Only valid from `Pending`.
    pub fn mark_ready(&self, token: AccessToken) -> Result<()> {
        let mut state = self.state.write();
        match &*state {
            SessionState::Pending => {
                *state = SessionState::Ready(token);
                tracing::debug!("store session ready");
                Ok(())
            }
            SessionState::Revoked => Err(LedgerError::SessionRevoked),
            other => Err(LedgerError::Unauthenticated(format!(
                "cannot become ready from {:?}",
                other
            ))),
        }
    }

    /// Record a terminal initialization failure.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "store session failed to initialize");
        let mut state = self.state.write();
        if matches!(*state, SessionState::Pending) {
            *state = SessionState::Failed(reason);
        }
    }

    /// Revoke the session, returning the token that was in use.
    pub fn revoke(&self) -> Option<AccessToken> {
        let previous = std::mem::replace(&mut *self.state.write(), SessionState::Revoked);
        match previous {
            SessionState::Ready(token) => Some(token),
            _ => None,
        }
    }

    /// The token, if the session is usable.
    pub fn ready(&self) -> Result<AccessToken> {
        match &*self.state.read() {
            SessionState::Ready(token) => Ok(token.clone()),
            SessionState::Pending | SessionState::Failed(_) => Err(LedgerError::NotInitialized),
            SessionState::Revoked => Err(LedgerError::SessionRevoked),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), SessionState::Ready(_))
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }
}
