// Chat service - Chatbot exchanges and per-user history
use crate::application::chat_repository::ChatRepository;
use crate::application::clock::Clock;
use crate::application::error::ChatError;
use crate::application::text_generator::TextGenerator;
use crate::domain::chat::{ChatEntry, NewChat, format_response, sanitize_title};
use chrono::Duration;
use std::sync::Arc;

const HISTORY_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct ChatService {
    repository: Arc<dyn ChatRepository>,
    generator: Arc<dyn TextGenerator>,
    clock: Arc<dyn Clock>,
}

impl ChatService {
    pub fn new(
        repository: Arc<dyn ChatRepository>,
        generator: Arc<dyn TextGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            generator,
            clock,
        }
    }

    /// Ask the generator, title the exchange, store it and return the
    /// formatted reply.
    pub async fn send(&self, user_id: i64, message: &str) -> Result<String, ChatError> {
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let reply = self
            .generator
            .generate(message)
            .await
            .map_err(ChatError::Generation)?;
        let formatted = format_response(reply.trim());

        let title_prompt = format!(
            "Generate a concise and meaningful title for a conversation that reflects the full context of the interaction. Include user input.\n\nUser: {}",
            message
        );
        let title = self
            .generator
            .generate(&title_prompt)
            .await
            .map_err(ChatError::Generation)?;

        let entry = self
            .repository
            .insert(NewChat {
                user_id,
                title: sanitize_title(&title),
                user_input: message.to_string(),
                bot_response: formatted.clone(),
            })
            .await
            .map_err(ChatError::Storage)?;

        tracing::debug!("Stored chat {} for user {}", entry.id, user_id);
        Ok(formatted)
    }

    /// The user's exchanges from the last week, newest first.
    pub async fn history(&self, user_id: i64) -> Result<Vec<ChatEntry>, ChatError> {
        let since = self.clock.now() - Duration::days(HISTORY_WINDOW_DAYS);
        let history = self
            .repository
            .list_since(user_id, since)
            .await
            .map_err(ChatError::Storage)?;

        tracing::debug!("Returning {} chat entries for user {}", history.len(), user_id);
        Ok(history)
    }

    pub async fn detail(&self, user_id: i64, id: u64) -> Result<ChatEntry, ChatError> {
        self.owned(user_id, id).await
    }

    /// Rename an exchange. `None` keeps the current title, still sanitized.
    pub async fn rename(&self, user_id: i64, id: u64, title: Option<String>) -> Result<String, ChatError> {
        let entry = self.owned(user_id, id).await?;
        let raw = title.or(entry.title).unwrap_or_default();
        let title = sanitize_title(&raw);

        self.repository
            .update_title(id, title.clone())
            .await
            .map_err(ChatError::Storage)?
            .ok_or(ChatError::NotFound)?;

        Ok(title)
    }

    pub async fn delete(&self, user_id: i64, id: u64) -> Result<(), ChatError> {
        self.owned(user_id, id).await?;
        if !self.repository.delete(id).await.map_err(ChatError::Storage)? {
            return Err(ChatError::NotFound);
        }
        Ok(())
    }

    async fn owned(&self, user_id: i64, id: u64) -> Result<ChatEntry, ChatError> {
        let entry = self
            .repository
            .get(id)
            .await
            .map_err(ChatError::Storage)?
            .ok_or(ChatError::NotFound)?;

        if entry.user_id != user_id {
            tracing::warn!("User {} tried to access chat {} owned by another user", user_id, id);
            return Err(ChatError::Forbidden);
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::air_quality_service::tests::{FakeGenerator, FixedClock};
    use crate::infrastructure::memory_chat_repository::MemoryChatRepository;
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_207_845, 0).unwrap()
    }

    fn service(replies: &[&str]) -> (ChatService, Arc<MemoryChatRepository>) {
        let clock = Arc::new(FixedClock(now()));
        let repository = Arc::new(MemoryChatRepository::new(clock.clone()));
        let svc = ChatService::new(repository.clone(), Arc::new(FakeGenerator::new(replies)), clock);
        (svc, repository)
    }

    #[tokio::test]
    async fn test_send_formats_and_stores() {
        let (svc, repository) = service(&["  Wear a *mask*. Stay in. ", "**Masks** and smog"]);

        let reply = svc.send(7, "What should I do?").await.unwrap();
        assert_eq!(reply, "Wear a mask.<br><br>Stay in.");

        let stored = repository.get(1).await.unwrap().unwrap();
        assert_eq!(stored.user_id, 7);
        assert_eq!(stored.title.as_deref(), Some("Masks and smog"));
        assert_eq!(stored.user_input, "What should I do?");
        assert_eq!(stored.bot_response, reply);
    }

    #[tokio::test]
    async fn test_send_rejects_empty_message() {
        let (svc, repository) = service(&["unused"]);
        assert!(matches!(svc.send(7, "").await, Err(ChatError::EmptyMessage)));
        assert!(repository.get(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_accepts_whitespace_message() {
        let (svc, repository) = service(&["Breathe.", "Blank"]);

        assert_eq!(svc.send(7, "  ").await.unwrap(), "Breathe.");
        assert_eq!(repository.get(1).await.unwrap().unwrap().user_input, "  ");
    }

    #[tokio::test]
    async fn test_send_generation_failure_stores_nothing() {
        let (svc, repository) = service(&["reply only"]);

        assert!(matches!(svc.send(7, "hi").await, Err(ChatError::Generation(_))));
        assert!(repository.get(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_is_per_user_and_newest_first() {
        let (svc, _) = service(&["a", "t1", "b", "t2", "c", "t3"]);
        svc.send(1, "first").await.unwrap();
        svc.send(2, "other user").await.unwrap();
        svc.send(1, "second").await.unwrap();

        let history = svc.history(1).await.unwrap();
        let inputs: Vec<&str> = history.iter().map(|c| c.user_input.as_str()).collect();
        assert_eq!(inputs, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_ownership_checks() {
        let (svc, _) = service(&["a", "title"]);
        svc.send(1, "mine").await.unwrap();

        assert!(matches!(svc.detail(2, 1).await, Err(ChatError::Forbidden)));
        assert!(matches!(svc.delete(2, 1).await, Err(ChatError::Forbidden)));
        assert!(matches!(svc.detail(1, 99).await, Err(ChatError::NotFound)));
        assert_eq!(svc.detail(1, 1).await.unwrap().user_input, "mine");
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let (svc, _) = service(&["a", "title"]);
        svc.send(1, "mine").await.unwrap();

        let title = svc.rename(1, 1, Some("  *New* name ".to_string())).await.unwrap();
        assert_eq!(title, "New name");
        assert_eq!(svc.rename(1, 1, None).await.unwrap(), "New name");

        svc.delete(1, 1).await.unwrap();
        assert!(matches!(svc.detail(1, 1).await, Err(ChatError::NotFound)));
    }

    #[tokio::test]
    async fn test_rename_to_blank_clears_title() {
        let (svc, repository) = service(&["a", "title"]);
        svc.send(1, "mine").await.unwrap();

        assert_eq!(svc.rename(1, 1, Some("**".to_string())).await.unwrap(), "");
        assert_eq!(repository.get(1).await.unwrap().unwrap().title, None);
    }
}
