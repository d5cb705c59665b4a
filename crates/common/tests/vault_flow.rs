//! End-to-end vault flow against in-memory collaborators

mod common;

use ::common::content_store::{parse_cid, ContentStore, MemoryStore};
use ::common::crypto::{DecryptionError, DerivedKey, Envelope};
use ::common::document::{ContentHash, DocumentStore, NewDocument};
use bytes::Bytes;

#[tokio::test]
async fn test_upload_then_fetch() {
    let (vault, auth) = common::setup_vault();
    let content = MemoryStore::new();
    let (wallet, signature) = common::signed_wallet(auth.challenge());

    let login = auth
        .authenticate(&wallet.public().to_string(), &signature)
        .await
        .unwrap();
    let owner = auth
        .authorize(Some(login.session.credential.as_str()))
        .unwrap();

    // upload
    let file = Bytes::from_static(b"quarterly report");
    let cid = content.put(file.clone()).await.unwrap();
    let key = DerivedKey::derive(&wallet, auth.challenge()).unwrap();
    let envelope = Envelope::seal(&cid.to_string(), &key).unwrap().encode();
    let document = NewDocument::new(
        envelope,
        "report.txt",
        "text/plain",
        ContentHash::sha256(&file),
    )
    .unwrap();
    let created = vault.create_document(&owner, document).await.unwrap();

    // fetch, with a key derived from a fresh signature
    let listed = vault.list_documents(&owner).await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let key = DerivedKey::derive(&wallet, auth.challenge()).unwrap();
    let opened = listed[0].envelope().open(&key).unwrap();
    let fetched = content.get(&parse_cid(&opened).unwrap()).await.unwrap();
    assert_eq!(fetched, file);
    assert_eq!(listed[0].content_hash().unwrap(), ContentHash::sha256(&fetched));
}

#[tokio::test]
async fn test_other_wallet_cannot_open() {
    let (vault, auth) = common::setup_vault();
    let (alice, alice_sig) = common::signed_wallet(auth.challenge());
    let (mallory, _) = common::signed_wallet(auth.challenge());

    let login = auth
        .authenticate(&alice.public().to_string(), &alice_sig)
        .await
        .unwrap();

    let key = DerivedKey::derive(&alice, auth.challenge()).unwrap();
    let envelope = Envelope::seal("bafkreitest", &key).unwrap().encode();
    let document = NewDocument::new(envelope, "x", "text/plain", ContentHash::sha256(b"x")).unwrap();
    let record = vault
        .create_document(&login.identity, document)
        .await
        .unwrap();

    let wrong_key = DerivedKey::derive(&mallory, auth.challenge()).unwrap();
    assert_eq!(
        record.envelope().open(&wrong_key),
        Err(DecryptionError::Authentication)
    );
}

#[tokio::test]
async fn test_concurrent_first_login_registers_once() {
    let (vault, auth) = common::setup_vault();
    let (wallet, signature) = common::signed_wallet(auth.challenge());
    let public_key = wallet.public().to_string();

    let attempts = (0..16).map(|_| {
        let auth = auth.clone();
        let public_key = public_key.clone();
        let signature = signature.clone();
        tokio::spawn(async move { auth.authenticate(&public_key, &signature).await })
    });

    let mut registered = 0;
    for attempt in attempts.collect::<Vec<_>>() {
        let login = attempt.await.unwrap().unwrap();
        assert_eq!(login.identity.public_key(), &wallet.public());
        if login.registered {
            registered += 1;
        }
    }

    assert_eq!(registered, 1);
    assert_eq!(vault.wallet_count(), 1);
}
