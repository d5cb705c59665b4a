use async_trait::async_trait;
use time::OffsetDateTime;

use common::auth::WalletIdentity;
use common::document::{DocumentRecord, DocumentStore, DocumentStoreError, NewDocument};

use crate::database::types::{DPublicKey, DUuid};
use crate::database::Database;

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: DUuid,
    public_key: DPublicKey,
    name: String,
    #[sqlx(rename = "type")]
    mime_type: String,
    encryptedcid: String,
    iv: String,
    file_hash: String,
    created_at: OffsetDateTime,
}

impl From<DocumentRow> for DocumentRecord {
    fn from(row: DocumentRow) -> Self {
        DocumentRecord {
            id: row.id.into(),
            name: row.name,
            mime_type: row.mime_type,
            encrypted_cid: row.encryptedcid,
            iv: row.iv,
            file_hash: row.file_hash,
            owner: row.public_key.into(),
            created_at: row.created_at,
        }
    }
}

impl Database {
    pub async fn count_documents(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&**self)
            .await
    }
}

#[async_trait]
impl DocumentStore for Database {
    type Error = sqlx::Error;

    async fn create_document(
        &self,
        owner: &WalletIdentity,
        document: NewDocument,
    ) -> Result<DocumentRecord, DocumentStoreError<Self::Error>> {
        let record = DocumentRecord::create(owner, document);

        sqlx::query(
            r#"
            INSERT INTO documents
                (id, public_key, name, type, encryptedcid, iv, file_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(DUuid(record.id))
        .bind(DPublicKey(record.owner))
        .bind(&record.name)
        .bind(&record.mime_type)
        .bind(&record.encrypted_cid)
        .bind(&record.iv)
        .bind(&record.file_hash)
        .bind(record.created_at)
        .execute(&**self)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                DocumentStoreError::UnknownOwner(record.owner)
            }
            e => DocumentStoreError::Provider(e),
        })?;

        Ok(record)
    }

    async fn list_documents(
        &self,
        owner: &WalletIdentity,
    ) -> Result<Vec<DocumentRecord>, DocumentStoreError<Self::Error>> {
        let registered: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM wallets WHERE public_key = ?)")
                .bind(DPublicKey(*owner.public_key()))
                .fetch_one(&**self)
                .await
                .map_err(DocumentStoreError::Provider)?;
        if !registered {
            return Err(DocumentStoreError::UnknownOwner(*owner.public_key()));
        }

        // rowid follows insertion order, which is creation order
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, public_key, name, type, encryptedcid, iv, file_hash, created_at
            FROM documents
            WHERE public_key = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(DPublicKey(*owner.public_key()))
        .fetch_all(&**self)
        .await
        .map_err(DocumentStoreError::Provider)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::auth::IdentityStore;
    use common::crypto::{EncodedEnvelope, SecretKey};
    use common::document::ContentHash;

    async fn memory_db() -> Database {
        let url = url::Url::parse("sqlite::memory:").unwrap();
        Database::connect(&url).await.unwrap()
    }

    fn document(name: &str) -> NewDocument {
        NewDocument::new(
            EncodedEnvelope {
                encrypted_cid: "AbC123==".into(),
                iv: "Xyz==".into(),
            },
            name,
            "application/pdf",
            ContentHash::sha256(name.as_bytes()),
        )
        .unwrap()
    }

    async fn registered(db: &Database) -> WalletIdentity {
        let key = SecretKey::generate().unwrap().public();
        db.ensure_wallet(&key).await.unwrap().0.identity()
    }

    #[tokio::test]
    async fn test_create_then_list_in_order() {
        let db = memory_db().await;
        let owner = registered(&db).await;
        let other = registered(&db).await;

        let first = db.create_document(&owner, document("one")).await.unwrap();
        db.create_document(&other, document("theirs")).await.unwrap();
        let second = db.create_document(&owner, document("two")).await.unwrap();

        let listed = db.list_documents(&owner).await.unwrap();
        assert_eq!(
            listed.iter().map(|d| d.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert_eq!(listed[0].encrypted_cid, "AbC123==");
        assert_eq!(listed[0].iv, "Xyz==");
        assert_eq!(listed[0].file_hash, first.file_hash);
        assert_eq!(listed[0].owner, *owner.public_key());
    }

    #[tokio::test]
    async fn test_empty_list() {
        let db = memory_db().await;
        let owner = registered(&db).await;
        assert!(db.list_documents(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_owner_rejected() {
        let db = memory_db().await;
        let stranger = WalletIdentity::new(SecretKey::generate().unwrap().public());
        assert!(matches!(
            db.create_document(&stranger, document("x")).await,
            Err(DocumentStoreError::UnknownOwner(_))
        ));
        assert!(matches!(
            db.list_documents(&stranger).await,
            Err(DocumentStoreError::UnknownOwner(_))
        ));
    }
}
