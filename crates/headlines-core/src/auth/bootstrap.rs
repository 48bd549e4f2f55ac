//! Startup sequence that seeds and warms the session.
//!
//! The sequence writes the configured token into the credential store, reads
//! the account back and hands it to the [`SessionCache`]. It is started as a
//! detached task and nothing waits for it: a request issued before it
//! finishes goes out without a token.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::AccountProperties;

use super::{AccountStore, SessionCache};

/// Env var (compile time first, then runtime) holding the initial API key.
pub const TOKEN_ENV_VAR: &str = "NEWS_API_ACCESS_KEY";

/// How the bootstrap ended. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An account was read back and is now the current session.
    Warmed,
    /// The store had no account; the session keeps its empty token.
    StoreEmpty,
    /// Reading the store failed; the session keeps its empty token.
    StoreFailed(String),
}

impl BootstrapOutcome {
    pub fn is_warmed(&self) -> bool {
        matches!(self, BootstrapOutcome::Warmed)
    }
}

/// Token baked in at build time, else taken from the environment.
pub fn configured_token() -> Option<String> {
    resolve_token(option_env!("NEWS_API_ACCESS_KEY"), || {
        std::env::var(TOKEN_ENV_VAR).ok()
    })
}

/// A blank value at either level counts as unset.
fn resolve_token(
    compiled: Option<&str>,
    runtime: impl FnOnce() -> Option<String>,
) -> Option<String> {
    let non_blank = |t: &String| !t.trim().is_empty();
    compiled
        .map(str::to_string)
        .filter(non_blank)
        .or_else(|| runtime().filter(non_blank))
}

/// Runs the store write and read-back, then updates the session.
pub struct BootstrapSequencer {
    store: Arc<dyn AccountStore>,
    session: Arc<SessionCache>,
    seed_token: Option<String>,
}

impl BootstrapSequencer {
    pub fn new(
        store: Arc<dyn AccountStore>,
        session: Arc<SessionCache>,
        seed_token: Option<String>,
    ) -> Self {
        Self {
            store,
            session,
            seed_token,
        }
    }

    /// Run the sequence on the blocking pool and return its outcome.
    pub async fn run(self) -> BootstrapOutcome {
        let store = Arc::clone(&self.store);
        let seed_token = self.seed_token.clone();

        let read_back = tokio::task::spawn_blocking(move || {
            Self::seed_and_read(store.as_ref(), seed_token)
        })
        .await;

        let outcome = match read_back {
            Ok(Ok(Some(properties))) => {
                self.session.set_account_properties(Some(properties));
                BootstrapOutcome::Warmed
            }
            Ok(Ok(None)) => BootstrapOutcome::StoreEmpty,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read account from credential store");
                BootstrapOutcome::StoreFailed(e.to_string())
            }
            Err(e) => {
                warn!(error = %e, "Bootstrap task did not complete");
                BootstrapOutcome::StoreFailed(e.to_string())
            }
        };

        info!(?outcome, "Session bootstrap finished");
        outcome
    }

    /// Start the sequence as a detached task. Dropping the handle is fine.
    pub fn spawn(self) -> JoinHandle<BootstrapOutcome> {
        tokio::spawn(self.run())
    }

    fn seed_and_read(
        store: &dyn AccountStore,
        seed_token: Option<String>,
    ) -> anyhow::Result<Option<AccountProperties>> {
        match seed_token {
            Some(token) => {
                // A failed write still falls through to the read-back.
                if let Err(e) = store.insert_account_properties(&AccountProperties::new(token)) {
                    warn!(error = %e, "Failed to seed credential store");
                }
            }
            None => debug!("No configured token, using stored account only"),
        }
        store.get_account_properties()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::auth::{MemoryAccountStore, RequestAuthenticator};

    struct BrokenStore;

    impl AccountStore for BrokenStore {
        fn insert_account_properties(&self, _: &AccountProperties) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }

        fn get_account_properties(&self) -> anyhow::Result<Option<AccountProperties>> {
            Err(anyhow!("disk unreadable"))
        }

        fn clear(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    /// Accepts writes but never returns anything.
    struct BlackHoleStore;

    impl AccountStore for BlackHoleStore {
        fn insert_account_properties(&self, _: &AccountProperties) -> anyhow::Result<()> {
            Ok(())
        }

        fn get_account_properties(&self) -> anyhow::Result<Option<AccountProperties>> {
            Ok(None)
        }

        fn clear(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn session() -> (RequestAuthenticator, Arc<SessionCache>) {
        let auth = RequestAuthenticator::new();
        let session = Arc::new(SessionCache::new(auth.clone()));
        (auth, session)
    }

    #[test]
    fn test_blank_compiled_token_falls_back_to_env() {
        assert_eq!(
            resolve_token(Some(""), || Some("from-env".to_string())),
            Some("from-env".to_string())
        );
        assert_eq!(
            resolve_token(Some("built-in"), || Some("from-env".to_string())),
            Some("built-in".to_string())
        );
        assert_eq!(resolve_token(None, || Some("  ".to_string())), None);
        assert_eq!(resolve_token(None, || None), None);
    }

    #[tokio::test]
    async fn test_fresh_start_seeds_and_warms() {
        let store = Arc::new(MemoryAccountStore::default());
        let (auth, session) = session();

        let outcome = BootstrapSequencer::new(
            store.clone(),
            Arc::clone(&session),
            Some("abc123".to_string()),
        )
        .run()
        .await;

        assert_eq!(outcome, BootstrapOutcome::Warmed);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get_account_properties().expect("read").map(|p| p.token),
            Some("abc123".to_string())
        );
        assert_eq!(auth.token().as_str(), "abc123");
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let store = Arc::new(MemoryAccountStore::default());
        let (auth, session) = session();

        for _ in 0..2 {
            let outcome = BootstrapSequencer::new(
                store.clone(),
                Arc::clone(&session),
                Some("abc123".to_string()),
            )
            .spawn()
            .await
            .expect("bootstrap task");
            assert!(outcome.is_warmed());
        }

        assert_eq!(store.len(), 1);
        assert_eq!(auth.token().as_str(), "abc123");
    }

    #[tokio::test]
    async fn test_empty_store_leaves_token_empty() {
        let (auth, session) = session();

        let outcome = BootstrapSequencer::new(Arc::new(BlackHoleStore), session, Some("abc123".into()))
            .run()
            .await;

        assert_eq!(outcome, BootstrapOutcome::StoreEmpty);
        assert_eq!(auth.token().as_str(), "");
    }

    #[tokio::test]
    async fn test_failing_store_is_tolerated() {
        let (auth, session) = session();

        let outcome = BootstrapSequencer::new(Arc::new(BrokenStore), session, Some("abc123".into()))
            .run()
            .await;

        assert!(matches!(outcome, BootstrapOutcome::StoreFailed(_)));
        assert_eq!(auth.token().as_str(), "");
    }

    #[tokio::test]
    async fn test_without_seed_uses_stored_account() {
        let store = Arc::new(MemoryAccountStore::default());
        store
            .insert_account_properties(&AccountProperties::new("saved-key"))
            .expect("insert");
        let (auth, session) = session();

        let outcome = BootstrapSequencer::new(store, Arc::clone(&session), None).run().await;

        assert!(outcome.is_warmed());
        assert_eq!(auth.token().as_str(), "saved-key");
        assert_eq!(
            session.account_properties().map(|p| p.token),
            Some("saved-key".to_string())
        );
    }
}
