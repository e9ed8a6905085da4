//! Credential handling for authenticated API calls.
//!
//! The API client never reads ambient session state: callers inject a
//! [`CredentialProvider`] and every authenticated request asks it for the
//! current bearer token. This keeps the search controller and preview
//! loader testable with a fake credential source.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CredentialError>;

#[cfg(feature = "keyring")]
impl From<keyring::Error> for CredentialError {
    fn from(e: keyring::Error) -> Self {
        match e {
            keyring::Error::NoEntry => CredentialError::NotFound("keyring entry".to_string()),
            other => CredentialError::Storage(other.to_string()),
        }
    }
}

// ============================================================================
// Credential Provider Capability
// ============================================================================

/// Source of the bearer token attached to authenticated requests.
///
/// `Ok(None)` means "no token held"; the client maps that to a
/// not-authenticated error for endpoints that require identity. Errors are
/// reserved for storage failures (keyring unavailable, etc.).
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, if one is held.
    async fn bearer_token(&self) -> Result<Option<String>>;
}

/// Fixed-token provider.
///
/// Wraps a token obtained elsewhere (login response, environment,
/// paste-in). Cheap to clone.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

/// In-memory provider with interior mutability.
///
/// Suits hosts that log in at runtime: start empty, call [`set_token`]
/// with the login response, [`clear`] on logout.
///
/// [`set_token`]: MemoryCredentials::set_token
/// [`clear`]: MemoryCredentials::clear
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: RwLock<Option<String>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }
}

#[async_trait]
impl CredentialProvider for MemoryCredentials {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }
}

// ============================================================================
// Keyring-Backed Provider (feature-gated)
// ============================================================================

/// Keyring-based credential storage.
///
/// Uses the system's native credential store (macOS Keychain, Linux Secret
/// Service, Windows Credential Manager) to persist the bearer token across
/// runs. Requires the `keyring` cargo feature.
#[cfg(feature = "keyring")]
pub mod keyring_store {
    use super::{async_trait, CredentialError, CredentialProvider, Result};
    use keyring::Entry;

    const SERVICE_NAME: &str = "datamere";

    #[derive(Debug, Clone)]
    pub struct KeyringCredentials {
        account: String,
    }

    impl Default for KeyringCredentials {
        fn default() -> Self {
            Self::new()
        }
    }

    impl KeyringCredentials {
        /// Create a provider using the default account name "api-token".
        pub fn new() -> Self {
            Self {
                account: "api-token".to_string(),
            }
        }

        /// Use a custom account name (multiple users on one machine).
        pub fn with_account(account: impl Into<String>) -> Self {
            Self {
                account: account.into(),
            }
        }

        /// Check whether a keyring backend is available and functional.
        pub fn is_available() -> bool {
            match Entry::new(SERVICE_NAME, "availability-check") {
                Ok(entry) => match entry.get_password() {
                    Ok(_) => true,
                    Err(keyring::Error::NoEntry) => true,
                    Err(keyring::Error::NoStorageAccess(_)) => false,
                    Err(keyring::Error::PlatformFailure(_)) => false,
                    Err(_) => true,
                },
                Err(_) => false,
            }
        }

        /// Persist a token.
        pub fn store_token(&self, token: &str) -> Result<()> {
            let entry = self.entry()?;
            entry.set_password(token)?;
            log::info!("Stored API token in system keyring");
            Ok(())
        }

        /// Remove the stored token, if any.
        pub fn delete_token(&self) -> Result<()> {
            let entry = self.entry()?;
            match entry.delete_password() {
                Ok(()) => {
                    log::info!("Deleted API token from system keyring");
                    Ok(())
                }
                Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e.into()),
            }
        }

        fn entry(&self) -> Result<Entry> {
            Entry::new(SERVICE_NAME, &self.account)
                .map_err(|e| CredentialError::Storage(e.to_string()))
        }
    }

    #[async_trait]
    impl CredentialProvider for KeyringCredentials {
        async fn bearer_token(&self) -> Result<Option<String>> {
            let entry = self.entry()?;
            match entry.get_password() {
                Ok(token) => Ok(Some(token)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[cfg(feature = "keyring")]
pub use keyring_store::KeyringCredentials;

// ============================================================================
// Helper Functions
// ============================================================================

/// Mask a token for display (show first 4 and last 4 chars).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        return "********".to_string();
    }
    format!("{}...{}", &token[..4], &token[token.len() - 4..])
}
