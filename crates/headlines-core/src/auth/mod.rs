//! Authentication module for the News API access key.
//!
//! This module provides:
//! - `AccountStore`: durable storage of the account record (file, keychain, memory)
//! - `RequestAuthenticator`: attaches the current key to every outgoing request
//! - `SessionCache`: the current account and key, shared with the API client
//! - `BootstrapSequencer`: seeds the store on startup and warms the session

pub mod authenticator;
pub mod bootstrap;
pub mod credentials;
pub mod session;

pub use authenticator::{RequestAuthenticator, API_KEY_HEADER};
pub use bootstrap::{configured_token, BootstrapOutcome, BootstrapSequencer, TOKEN_ENV_VAR};
pub use credentials::{
    open_store, AccountStore, CredentialBackend, FileAccountStore, KeychainAccountStore,
    MemoryAccountStore,
};
pub use session::{SessionCache, SessionSnapshot};
