// In-memory chat history store
use crate::application::chat_repository::ChatRepository;
use crate::application::clock::Clock;
use crate::domain::chat::{ChatEntry, NewChat};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Store {
    next_id: u64,
    entries: Vec<ChatEntry>,
}

pub struct MemoryChatRepository {
    store: RwLock<Store>,
    clock: Arc<dyn Clock>,
}

impl MemoryChatRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            clock,
        }
    }
}

#[async_trait]
impl ChatRepository for MemoryChatRepository {
    async fn insert(&self, chat: NewChat) -> Result<ChatEntry> {
        let mut store = self.store.write().await;
        store.next_id += 1;

        let entry = ChatEntry {
            id: store.next_id,
            user_id: chat.user_id,
            title: Some(chat.title).filter(|t| !t.is_empty()),
            user_input: chat.user_input,
            bot_response: chat.bot_response,
            timestamp: self.clock.now(),
        };
        store.entries.push(entry.clone());

        Ok(entry)
    }

    async fn list_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<Vec<ChatEntry>> {
        let store = self.store.read().await;
        let mut entries: Vec<ChatEntry> = store
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && e.timestamp >= since)
            .cloned()
            .collect();

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn get(&self, id: u64) -> Result<Option<ChatEntry>> {
        let store = self.store.read().await;
        Ok(store.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn update_title(&self, id: u64, title: String) -> Result<Option<ChatEntry>> {
        let mut store = self.store.write().await;
        Ok(store.entries.iter_mut().find(|e| e.id == id).map(|e| {
            e.title = Some(title).filter(|t| !t.is_empty());
            e.clone()
        }))
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut store = self.store.write().await;
        let before = store.entries.len();
        store.entries.retain(|e| e.id != id);
        Ok(store.entries.len() != before)
    }
}
