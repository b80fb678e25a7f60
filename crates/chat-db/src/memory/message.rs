use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use chat_core::entities::Message;
use chat_core::traits::{HistoryQuery, MessageStore, RepoResult};
use chat_core::value_objects::{MessageId, UserId};

/// Append-only message log held in memory
#[derive(Default)]
pub struct MemoryMessageStore {
    messages: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of everything appended so far, in append order
    pub fn all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    fn latest_matching<F>(&self, query: HistoryQuery, predicate: F) -> Vec<Message>
    where
        F: Fn(&Message) -> bool,
    {
        let messages = self.messages.read();
        let mut page: Vec<Message> = messages
            .iter()
            .rev()
            .filter(|m| query.before.map_or(true, |before| m.created_at < before))
            .filter(|m| predicate(m))
            .take(query.limit as usize)
            .cloned()
            .collect();
        page.reverse();
        page
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(&self, message: &Message) -> RepoResult<MessageId> {
        self.messages.write().push(message.clone());
        Ok(message.id)
    }

    async fn room_history(&self, room: &str, query: HistoryQuery) -> RepoResult<Vec<Message>> {
        Ok(self.latest_matching(query, |m| m.room_name() == Some(room)))
    }

    async fn private_history(
        &self,
        a: UserId,
        b: UserId,
        query: HistoryQuery,
    ) -> RepoResult<Vec<Message>> {
        let pair: HashSet<UserId> = [a, b].into_iter().collect();
        Ok(self.latest_matching(query, |m| {
            m.is_private() && m.recipients().iter().copied().collect::<HashSet<_>>() == pair
        }))
    }
}
