/// In-memory collaborators for tests
///
/// `MemoryVault` stands in for the database: it implements both the
/// identity and the document store contracts, and can be told to fail every
/// call to exercise internal-error paths.
///
/// # Example
///
/// ```rust,ignore
/// use common::testkit::MemoryVault;
///
/// let vault = MemoryVault::default();
/// let auth = Authenticator::new(vault.clone(), issuer, Challenge::default());
/// auth.authenticate(&public_key, &signature).await?;
/// assert_eq!(vault.wallet_count(), 1);
/// ```
mod vault;

pub use vault::{MemoryVault, MemoryVaultError};

use crate::crypto::EncodedEnvelope;
use crate::document::{ContentHash, NewDocument};

/// A valid document named `name` with placeholder envelope fields.
pub fn sample_document(name: &str) -> NewDocument {
    NewDocument::new(
        EncodedEnvelope {
            encrypted_cid: "AbC123==".into(),
            iv: "Xyz==".into(),
        },
        name,
        "text/plain",
        ContentHash::sha256(name.as_bytes()),
    )
    .expect("sample document is valid")
}
