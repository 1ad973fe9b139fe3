//! Contact-message storage using SQLite

use crate::{CoreError, CoreResult};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;
use tracing::{debug, info};

/// A contact-form submission as entered by a visitor
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// Stored contact message record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DbContact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
    pub is_read: bool,
    /// Internal notes, visible only in the admin view
    pub notes: String,
}

impl DbContact {
    /// Timestamp formatted for display; falls back to the raw stored value
    pub fn received_at(&self) -> String {
        chrono::NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%d %H:%M:%S")
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| self.created_at.clone())
    }
}

/// Database connection pool
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open or create a database at the given path
    pub async fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        info!("Opening database at {}", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let db = Self { pool };
        db.initialize().await?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub async fn open_memory() -> CoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.initialize().await?;

        Ok(db)
    }

    /// Initialize the database schema
    async fn initialize(&self) -> CoreResult<()> {
        debug!("Initializing database schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL DEFAULT '',
                subject TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                is_read INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_contacts_created ON contacts(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_contacts_read ON contacts(is_read);
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema initialized");
        Ok(())
    }

    /// Store a new contact message; returns its id
    pub async fn insert_contact(&self, contact: &NewContact) -> CoreResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, phone, subject, message)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.subject)
        .bind(&contact.message)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, "Stored contact message from {}", contact.email);
        Ok(id)
    }

    /// Fetch one contact message
    pub async fn get_contact(&self, id: i64) -> CoreResult<DbContact> {
        let contact: Option<DbContact> = sqlx::query_as(
            "SELECT id, name, email, phone, subject, message, created_at, is_read, notes
             FROM contacts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        contact.ok_or(CoreError::ContactNotFound(id))
    }

    /// List contact messages, newest first
    pub async fn list_contacts(&self, only_unread: bool) -> CoreResult<Vec<DbContact>> {
        let query = if only_unread {
            "SELECT id, name, email, phone, subject, message, created_at, is_read, notes
             FROM contacts WHERE is_read = 0 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT id, name, email, phone, subject, message, created_at, is_read, notes
             FROM contacts ORDER BY created_at DESC, id DESC"
        };

        let contacts = sqlx::query_as(query).fetch_all(&self.pool).await?;
        Ok(contacts)
    }

    /// Search contact messages over name, email, subject and message body
    pub async fn search_contacts(&self, term: &str) -> CoreResult<Vec<DbContact>> {
        let pattern = format!("%{}%", term);
        let contacts = sqlx::query_as(
            "SELECT id, name, email, phone, subject, message, created_at, is_read, notes
             FROM contacts
             WHERE name LIKE ?1 OR email LIKE ?1 OR subject LIKE ?1 OR message LIKE ?1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    /// Mark a message read or unread
    pub async fn set_read(&self, id: i64, is_read: bool) -> CoreResult<()> {
        let result = sqlx::query("UPDATE contacts SET is_read = ? WHERE id = ?")
            .bind(is_read)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ContactNotFound(id));
        }
        Ok(())
    }

    /// Replace the internal notes on a message
    pub async fn set_notes(&self, id: i64, notes: &str) -> CoreResult<()> {
        let result = sqlx::query("UPDATE contacts SET notes = ? WHERE id = ?")
            .bind(notes)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ContactNotFound(id));
        }
        Ok(())
    }

    /// Number of unread messages
    pub async fn count_unread(&self) -> CoreResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM contacts WHERE is_read = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, subject: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: String::new(),
            subject: subject.to_string(),
            message: "I would like to hear more about your listings.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::open_memory().await.unwrap();
        let id = db.insert_contact(&sample("Alice", "Rental inquiry")).await.unwrap();

        let contact = db.get_contact(id).await.unwrap();
        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.email, "alice@example.com");
        assert!(!contact.is_read);
        assert!(contact.notes.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_contact() {
        let db = Database::open_memory().await.unwrap();
        assert!(matches!(
            db.get_contact(42).await,
            Err(CoreError::ContactNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_unread_filter() {
        let db = Database::open_memory().await.unwrap();
        let first = db.insert_contact(&sample("Alice", "First")).await.unwrap();
        let second = db.insert_contact(&sample("Bob", "Second")).await.unwrap();

        let all = db.list_contacts(false).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second, "newest first");

        db.set_read(second, true).await.unwrap();
        let unread = db.list_contacts(true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, first);
    }

    #[tokio::test]
    async fn test_read_transitions_and_count() {
        let db = Database::open_memory().await.unwrap();
        let id = db.insert_contact(&sample("Alice", "Hello")).await.unwrap();
        assert_eq!(db.count_unread().await.unwrap(), 1);

        db.set_read(id, true).await.unwrap();
        assert_eq!(db.count_unread().await.unwrap(), 0);
        assert!(db.get_contact(id).await.unwrap().is_read);

        db.set_read(id, false).await.unwrap();
        assert_eq!(db.count_unread().await.unwrap(), 1);

        assert!(matches!(
            db.set_read(99, true).await,
            Err(CoreError::ContactNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_notes_are_stored() {
        let db = Database::open_memory().await.unwrap();
        let id = db.insert_contact(&sample("Alice", "Hello")).await.unwrap();

        db.set_notes(id, "Called back on Monday").await.unwrap();
        assert_eq!(db.get_contact(id).await.unwrap().notes, "Called back on Monday");
    }

    #[tokio::test]
    async fn test_search_matches_fields() {
        let db = Database::open_memory().await.unwrap();
        db.insert_contact(&sample("Alice", "Beach house")).await.unwrap();
        db.insert_contact(&sample("Bob", "Downtown loft")).await.unwrap();

        let hits = db.search_contacts("beach").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Alice");

        let hits = db.search_contacts("bob@example.com").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bob");

        assert!(db.search_contacts("penthouse").await.unwrap().is_empty());
    }
}
