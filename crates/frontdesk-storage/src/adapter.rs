// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use frontdesk_config::model::StorageConfig;
use frontdesk_core::{
    AdapterType, Alert, Conversation, ConversationId, ConversationStatus, ConversationStore,
    Customer, CustomerId, FrontdeskError, HealthStatus, Message, MessageId, PhoneNumber,
    PluginAdapter, Sender,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed conversation store.
///
/// The database is opened lazily by [`ConversationStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store; nothing is opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database.
    pub fn with_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, FrontdeskError> {
        self.db.get().ok_or_else(|| FrontdeskError::Storage {
            source: "store not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), FrontdeskError> {
        if !self.config.wal_mode {
            return Ok(());
        }
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FrontdeskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FrontdeskError> {
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn initialize(&self) -> Result<(), FrontdeskError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| FrontdeskError::Storage {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), FrontdeskError> {
        let db = self.db()?;
        self.checkpoint(db).await
    }

    async fn find_or_create_customer(
        &self,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<Customer, FrontdeskError> {
        queries::customers::find_or_create(self.db()?, phone, now).await
    }

    async fn get_customer(&self, id: &CustomerId) -> Result<Option<Customer>, FrontdeskError> {
        queries::customers::get(self.db()?, id).await
    }

    async fn update_customer_contact(
        &self,
        id: &CustomerId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), FrontdeskError> {
        queries::customers::update_contact(self.db()?, id, name, email).await
    }

    async fn find_or_create_conversation(
        &self,
        customer_id: &CustomerId,
        channel: &str,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        queries::conversations::find_or_create(self.db()?, customer_id, channel, now).await
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, FrontdeskError> {
        queries::conversations::get(self.db()?, id).await
    }

    async fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<Conversation>, FrontdeskError> {
        queries::conversations::list(self.db()?, status).await
    }

    async fn update_conversation(
        &self,
        conversation: &Conversation,
        expected: ConversationStatus,
    ) -> Result<(), FrontdeskError> {
        queries::conversations::update(self.db()?, conversation, expected).await
    }

    async fn insert_message(&self, message: &Message) -> Result<(), FrontdeskError> {
        queries::messages::insert(self.db()?, message).await
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>, FrontdeskError> {
        queries::messages::get(self.db()?, id).await
    }

    async fn update_message_sender(
        &self,
        id: &MessageId,
        sender: Sender,
    ) -> Result<(), FrontdeskError> {
        queries::messages::update_sender(self.db()?, id, sender).await
    }

    async fn recent_messages(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, FrontdeskError> {
        queries::messages::recent(self.db()?, conversation_id, limit).await
    }

    async fn last_message_at(
        &self,
        conversation_id: &ConversationId,
        sender: Sender,
    ) -> Result<Option<DateTime<Utc>>, FrontdeskError> {
        queries::messages::last_at(self.db()?, conversation_id, sender).await
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), FrontdeskError> {
        queries::alerts::insert(self.db()?, alert).await
    }

    async fn last_alert(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Alert>, FrontdeskError> {
        queries::alerts::last(self.db()?, conversation_id).await
    }

    async fn list_alerts(&self, limit: usize) -> Result<Vec<Alert>, FrontdeskError> {
        queries::alerts::list(self.db()?, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_creates_nested_database_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("frontdesk.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert!(store.health_check().await.is_err());
        assert!(store.list_alerts(10).await.is_err());
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_database_runs_migrations() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqliteStore::with_database(make_config(":memory:"), db);
        assert!(store.list_conversations(None).await.unwrap().is_empty());
    }
}
