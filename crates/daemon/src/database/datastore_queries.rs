use async_trait::async_trait;

use common::datastore::{Datastore, DatastoreError, Key};

use crate::database::Database;

fn backend(e: sqlx::Error) -> DatastoreError {
    DatastoreError::Backend(e.to_string())
}

#[async_trait]
impl Datastore for Database {
    async fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, DatastoreError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM datastore WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&**self)
            .await
            .map_err(backend)?;

        Ok(row.map(|(value,)| value))
    }

    async fn put(&self, key: &Key, value: Vec<u8>) -> Result<(), DatastoreError> {
        sqlx::query(
            r#"
            INSERT INTO datastore (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .execute(&**self)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        sqlx::query("DELETE FROM datastore WHERE key = ?1")
            .bind(key.as_str())
            .execute(&**self)
            .await
            .map_err(backend)?;

        Ok(())
    }

    async fn query(&self, prefix: &Key) -> Result<Vec<(Key, Vec<u8>)>, DatastoreError> {
        let pattern = format!("{}/", prefix.as_str().trim_end_matches('/'));
        let rows: Vec<(String, Vec<u8>)> = sqlx::query_as(
            r#"
            SELECT key, value
            FROM datastore
            WHERE substr(key, 1, length(?1)) = ?1
            ORDER BY key
            "#,
        )
        .bind(pattern)
        .fetch_all(&**self)
        .await
        .map_err(backend)?;

        Ok(rows
            .into_iter()
            .map(|(key, value)| (Key::from(key), value))
            .collect())
    }
}
