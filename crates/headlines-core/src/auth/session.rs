use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::AccountProperties;

use super::RequestAuthenticator;

/// Consistent view of the session at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: String,
    pub account: Option<AccountProperties>,
}

/// In-memory holder of the current account and the outgoing-request token.
///
/// Shared through an `Arc` with everything that issues requests; there is
/// one per process. The token lives in the [`RequestAuthenticator`], the
/// account next to it, and both are written under the same lock.
pub struct SessionCache {
    authenticator: RequestAuthenticator,
    account: Mutex<Option<AccountProperties>>,
}

impl SessionCache {
    pub fn new(authenticator: RequestAuthenticator) -> Self {
        Self {
            authenticator,
            account: Mutex::new(None),
        }
    }

    /// Make `properties` the current account, or clear it with `None`.
    ///
    /// The authenticator token always ends up equal to the account token, or
    /// empty when there is no account. Concurrent callers: last write wins.
    pub fn set_account_properties(&self, properties: Option<AccountProperties>) {
        let mut account = self.lock_account();
        let token = properties
            .as_ref()
            .map(|p| p.token.clone())
            .unwrap_or_default();
        self.authenticator.set_token(token);
        *account = properties;
    }

    pub fn account_properties(&self) -> Option<AccountProperties> {
        self.lock_account().clone()
    }

    /// Token and account read together.
    pub fn snapshot(&self) -> SessionSnapshot {
        let account = self.lock_account();
        SessionSnapshot {
            token: self.authenticator.token().as_str().to_string(),
            account: account.clone(),
        }
    }

    pub fn token(&self) -> String {
        self.authenticator.token().as_str().to_string()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticator.has_token()
    }

    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    fn lock_account(&self) -> MutexGuard<'_, Option<AccountProperties>> {
        // The guarded value is replaced wholesale, so a poisoned lock still
        // holds a complete value.
        self.account.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(RequestAuthenticator::new())
    }
}
