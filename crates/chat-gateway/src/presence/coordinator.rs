//! Presence coordinator actor

use super::PresenceWriter;
use crate::broadcast::deliver_to;
use crate::connection::ConnectionRegistry;
use crate::protocol::{OfflinePayload, OnlinePayload, ServerEvent};
use chat_core::{UserDirectory, UserIdentity};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// A user's connection count crossed zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserTransition {
    /// 0 → 1
    Online {
        identity: UserIdentity,
        at: DateTime<Utc>,
    },
    /// 1 → 0
    Offline {
        identity: UserIdentity,
        at: DateTime<Utc>,
    },
}

impl UserTransition {
    pub fn identity(&self) -> &UserIdentity {
        match self {
            Self::Online { identity, .. } | Self::Offline { identity, .. } => identity,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Online { at, .. } | Self::Offline { at, .. } => *at,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online { .. })
    }

    fn to_event(&self) -> ServerEvent {
        match self {
            Self::Online { identity, .. } => ServerEvent::UserOnline(OnlinePayload {
                user_id: identity.id,
                username: identity.username.clone(),
            }),
            Self::Offline { identity, at } => ServerEvent::UserOffline(OfflinePayload {
                user_id: identity.id,
                username: identity.username.clone(),
                last_seen: *at,
            }),
        }
    }
}

#[derive(Debug)]
pub enum PresenceCommand {
    Transition(UserTransition),
    Flush(oneshot::Sender<()>),
}

/// Sending side of the coordinator's command channel
#[derive(Debug, Clone)]
pub struct PresenceHandle {
    tx: mpsc::UnboundedSender<PresenceCommand>,
}

impl PresenceHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PresenceCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a transition. Never blocks, so it is safe under the registry lock.
    pub fn transition(&self, transition: UserTransition) {
        let user_id = transition.identity().id;
        if self.tx.send(PresenceCommand::Transition(transition)).is_err() {
            tracing::debug!(user_id = %user_id, "Presence coordinator stopped, transition ignored");
        }
    }

    /// Wait until every transition queued before this call has been broadcast
    /// and its directory write attempted
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(PresenceCommand::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

/// Consumes transitions in registry order.
///
/// Holds the registry weakly: the registry owns the command sender, so a
/// strong reference here would keep both alive forever.
pub struct PresenceCoordinator {
    registry: Weak<ConnectionRegistry>,
    writer: PresenceWriter,
}

impl PresenceCoordinator {
    /// Spawn the coordinator and its writer
    pub fn spawn(
        commands: mpsc::UnboundedReceiver<PresenceCommand>,
        registry: Weak<ConnectionRegistry>,
        users: Arc<dyn UserDirectory>,
    ) -> JoinHandle<()> {
        let (writer, _writer_task) = PresenceWriter::spawn(users);
        let coordinator = Self { registry, writer };
        tokio::spawn(coordinator.run(commands))
    }

    async fn run(self, mut commands: mpsc::UnboundedReceiver<PresenceCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                PresenceCommand::Transition(transition) => self.apply(&transition),
                PresenceCommand::Flush(done) => self.writer.flush(done),
            }
        }

        tracing::debug!("Presence coordinator stopped");
    }

    fn apply(&self, transition: &UserTransition) {
        let identity = transition.identity();
        let delivered = self.broadcast(transition);

        if transition.is_online() {
            tracing::info!(user_id = %identity.id, username = %identity.username, delivered, "User online");
        } else {
            tracing::info!(user_id = %identity.id, username = %identity.username, delivered, "User offline");
        }

        self.writer
            .write(identity.id, transition.is_online(), transition.at());
    }

    fn broadcast(&self, transition: &UserTransition) -> usize {
        let Some(registry) = self.registry.upgrade() else {
            return 0;
        };
        let targets = registry.all();
        deliver_to(&targets, &transition.to_event())
    }
}

impl std::fmt::Debug for PresenceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceCoordinator")
            .field("writer", &self.writer)
            .finish()
    }
}
