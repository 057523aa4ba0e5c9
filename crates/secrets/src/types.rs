//! Redacting wrapper for resolved secret material
//!
//! Access tokens and variable values travel from the store to exactly one
//! outbound GitLab request. [`SecureSecret`] keeps them out of `Debug`,
//! `Display` and therefore out of tracing fields, and zeroes the buffer on drop.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// Secret material with redacted formatting.
///
/// ```ignore
/// let token = resolver.resolve(token_arn, None).await?;
/// request.bearer_auth(token.expose());
/// ```
#[derive(Clone)]
pub struct SecureSecret(SecretString);

impl SecureSecret {
    /// Wrap an owned value
    #[must_use]
    pub fn new(value: String) -> Self {
        Self(SecretString::from(value))
    }

    /// Borrow the plaintext. Hand it to the request, not to a logger.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for SecureSecret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureSecret {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecureSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
