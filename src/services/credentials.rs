//! Bearer token lookup.
//!
//! The token is resolved once and passed explicitly into every operation
//! that talks to the backend.

use std::fmt;

/// Environment variable that overrides the keychain.
pub const TOKEN_ENV: &str = "SPRINTDESK_TOKEN";

const KEYRING_SERVICE: &str = "sprintdesk";

/// An API token for the project-management backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token. Blank tokens are rejected.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Reads the token from the environment or the OS keychain.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    account: String,
}

impl CredentialStore {
    /// Creates a store for the given keychain account.
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    /// Resolves the token from the environment, then the keychain.
    ///
    /// Lookup failures are logged and reported as a missing credential.
    pub fn load(&self) -> Option<Credential> {
        if let Some(credential) = std::env::var(TOKEN_ENV).ok().and_then(Credential::new) {
            tracing::debug!("Using token from {}", TOKEN_ENV);
            return Some(credential);
        }

        let entry = match keyring::Entry::new(KEYRING_SERVICE, &self.account) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Keychain unavailable: {}", e);
                return None;
            }
        };

        match entry.get_password() {
            Ok(token) => Credential::new(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::warn!("Failed to read token from keychain: {}", e);
                None
            }
        }
    }
}
