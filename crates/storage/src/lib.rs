use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use shared::domain::{Contact, ContactId};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContact {
    pub contact_id: i64,
    pub name: String,
    pub number: String,
    pub created_at: DateTime<Utc>,
}

impl StoredContact {
    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            contact_id: row.try_get("id")?,
            name: row.try_get("name")?,
            number: row.try_get("number")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn into_contact(self) -> Contact {
        Contact {
            id: ContactId::from(self.contact_id),
            name: self.name,
            number: self.number,
        }
    }
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_contacts(&self) -> Result<Vec<StoredContact>> {
        let rows = sqlx::query("SELECT id, name, number, created_at FROM contacts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("failed to list contacts")?;
        rows.iter().map(StoredContact::from_row).collect()
    }

    pub async fn get_contact(&self, contact_id: i64) -> Result<Option<StoredContact>> {
        let row = sqlx::query("SELECT id, name, number, created_at FROM contacts WHERE id = ?")
            .bind(contact_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(StoredContact::from_row).transpose()
    }

    pub async fn find_contact_by_name(&self, name: &str) -> Result<Option<StoredContact>> {
        let row = sqlx::query("SELECT id, name, number, created_at FROM contacts WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(StoredContact::from_row).transpose()
    }

    /// Returns `None` when a contact with that name already exists.
    pub async fn insert_contact(&self, name: &str, number: &str) -> Result<Option<StoredContact>> {
        let created_at = Utc::now();
        let row = sqlx::query(
            "INSERT INTO contacts (name, number, created_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO NOTHING
             RETURNING id, name, number, created_at",
        )
        .bind(name)
        .bind(number)
        .bind(created_at)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to insert contact '{name}'"))?;
        let Some(row) = row else {
            debug!(name, "storage: contact name already taken");
            return Ok(None);
        };
        let stored = StoredContact::from_row(&row)?;
        debug!(contact_id = stored.contact_id, "storage: contact inserted");
        Ok(Some(stored))
    }

    /// Returns `false` when no row had that id.
    pub async fn delete_contact(&self, contact_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(contact_id)
            .execute(&self.pool)
            .await
            .context("failed to delete contact")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_contacts(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await
            .context("failed to count contacts")?;
        Ok(count)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
