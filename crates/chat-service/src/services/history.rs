//! Message history queries
//!
//! Pages come back oldest-first with each sender's display identity attached.

use std::collections::HashMap;

use chat_core::entities::Message;
use chat_core::traits::HistoryQuery;
use chat_core::value_objects::UserId;
use tracing::instrument;

use crate::dto::{HistoryParams, MessageResponse, SenderResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct HistoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> HistoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn room(&self, room: &str, params: HistoryParams) -> ServiceResult<Vec<MessageResponse>> {
        if room.is_empty() {
            return Err(ServiceError::validation("room must not be empty"));
        }

        let messages = self
            .ctx
            .messages()
            .room_history(room, self.query(&params))
            .await?;
        self.with_senders(messages).await
    }

    /// Private conversation between the caller and `other`
    #[instrument(skip(self))]
    pub async fn private(
        &self,
        caller: UserId,
        other: UserId,
        params: HistoryParams,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let messages = self
            .ctx
            .messages()
            .private_history(caller, other, self.query(&params))
            .await?;
        self.with_senders(messages).await
    }

    fn query(&self, params: &HistoryParams) -> HistoryQuery {
        HistoryQuery::new(params.before, self.ctx.history().clamp(params.limit))
    }

    /// Entries whose sender no longer resolves are left out of the page.
    async fn with_senders(&self, messages: Vec<Message>) -> ServiceResult<Vec<MessageResponse>> {
        let mut ids: Vec<UserId> = messages.iter().map(|m| m.sender_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let senders: HashMap<UserId, SenderResponse> = self
            .ctx
            .users()
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|user| (user.id, SenderResponse::from(user)))
            .collect();

        Ok(messages
            .into_iter()
            .filter_map(|message| match senders.get(&message.sender_id) {
                Some(sender) => Some(MessageResponse::new(message, sender.clone())),
                None => {
                    tracing::warn!(
                        message_id = %message.id,
                        sender_id = %message.sender_id,
                        "History entry has an unknown sender, skipping"
                    );
                    None
                }
            })
            .collect())
    }
}
