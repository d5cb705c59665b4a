use async_trait::async_trait;
use time::OffsetDateTime;

use common::auth::{IdentityStore, IdentityStoreError, WalletRecord};
use common::crypto::PublicKey;

use crate::database::{types::DPublicKey, Database};

#[derive(sqlx::FromRow)]
struct WalletRow {
    public_key: DPublicKey,
    created_at: OffsetDateTime,
}

impl From<WalletRow> for WalletRecord {
    fn from(row: WalletRow) -> Self {
        WalletRecord {
            public_key: row.public_key.into(),
            created_at: row.created_at,
        }
    }
}

impl Database {
    pub async fn count_wallets(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM wallets")
            .fetch_one(&**self)
            .await
    }
}

#[async_trait]
impl IdentityStore for Database {
    type Error = sqlx::Error;

    async fn find_wallet(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<WalletRecord>, IdentityStoreError<Self::Error>> {
        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT public_key, created_at
            FROM wallets
            WHERE public_key = ?
            "#,
        )
        .bind(DPublicKey(*public_key))
        .fetch_optional(&**self)
        .await
        .map_err(IdentityStoreError::Provider)?;

        Ok(row.map(Into::into))
    }

    async fn insert_wallet(
        &self,
        public_key: &PublicKey,
    ) -> Result<WalletRecord, IdentityStoreError<Self::Error>> {
        let created_at = OffsetDateTime::now_utc();

        // The UNIQUE constraint on public_key arbitrates concurrent first logins
        let result = sqlx::query(
            r#"
            INSERT INTO wallets (public_key, created_at)
            VALUES (?, ?)
            ON CONFLICT(public_key) DO NOTHING
            "#,
        )
        .bind(DPublicKey(*public_key))
        .bind(created_at)
        .execute(&**self)
        .await
        .map_err(IdentityStoreError::Provider)?;

        if result.rows_affected() == 0 {
            return Err(IdentityStoreError::Conflict);
        }

        Ok(WalletRecord {
            public_key: *public_key,
            created_at,
        })
    }
}
