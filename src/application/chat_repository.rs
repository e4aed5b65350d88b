// Repository trait for chatbot history
use crate::domain::chat::{ChatEntry, NewChat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Store an exchange and return it with its assigned id and timestamp
    async fn insert(&self, chat: NewChat) -> anyhow::Result<ChatEntry>;

    /// Entries of one user at or after `since`, newest first
    async fn list_since(&self, user_id: i64, since: DateTime<Utc>) -> anyhow::Result<Vec<ChatEntry>>;

    async fn get(&self, id: u64) -> anyhow::Result<Option<ChatEntry>>;

    async fn update_title(&self, id: u64, title: String) -> anyhow::Result<Option<ChatEntry>>;

    /// Returns false when no entry had that id
    async fn delete(&self, id: u64) -> anyhow::Result<bool>;
}
