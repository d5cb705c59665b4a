use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Message signed by wallets both to log in and to derive document keys.
pub const DEFAULT_CHALLENGE: &str =
    "Sign this message to access your DocVault. Signing proves you control this wallet.";

/// The fixed message client and server agree on.
///
/// It is configured once per process and never taken from a request body.
/// A client configured with a different challenge produces signatures the
/// server rejects and keys that cannot open existing envelopes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Challenge(Arc<str>);

impl Challenge {
    pub fn new(message: impl Into<String>) -> Self {
        Self(Arc::from(message.into()))
    }

    /// UTF-8 bytes that get signed and verified.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Challenge {
    fn default() -> Self {
        Self::new(DEFAULT_CHALLENGE)
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Challenge").field(&self.as_str()).finish()
    }
}

impl From<&str> for Challenge {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
