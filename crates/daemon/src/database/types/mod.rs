//! Text-backed column types
//!
//! SQLite has no native uuid or key types, so both are stored as their
//! canonical text form and parsed back on the way out.

use common::crypto::PublicKey;
use uuid::Uuid;

macro_rules! text_column {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub struct $name(pub $inner);

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl sqlx::Decode<'_, sqlx::Sqlite> for $name {
            fn decode(
                value: sqlx::sqlite::SqliteValueRef<'_>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
                Ok(Self(text.parse::<$inner>()?))
            }
        }

        impl sqlx::Encode<'_, sqlx::Sqlite> for $name {
            fn encode_by_ref(
                &self,
                args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'_>>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                args.push(sqlx::sqlite::SqliteArgumentValue::Text(
                    self.0.to_string().into(),
                ));
                Ok(sqlx::encode::IsNull::No)
            }
        }

        impl sqlx::Type<sqlx::Sqlite> for $name {
            fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
            }

            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as sqlx::Type<sqlx::Sqlite>>::type_info()
            }
        }
    };
}

text_column!(
    /// Document id column
    DUuid(Uuid)
);

text_column!(
    /// Wallet public key column, base58
    DPublicKey(PublicKey)
);

#[cfg(test)]
mod tests {
    use super::*;
    use common::crypto::SecretKey;

    #[tokio::test]
    async fn test_text_columns_round_trip() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();

        let key = DPublicKey(SecretKey::generate().unwrap().public());
        let id = DUuid(Uuid::new_v4());

        let (back_key, back_id): (DPublicKey, DUuid) = sqlx::query_as("SELECT ?, ?")
            .bind(key)
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(back_key, key);
        assert_eq!(back_id, id);

        let text: String = sqlx::query_scalar("SELECT ?")
            .bind(key)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(text, key.0.to_base58());
    }
}
