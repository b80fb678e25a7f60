//! Sequential presence writer

use chat_core::{UserDirectory, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum WriterCommand {
    Write {
        user_id: UserId,
        online: bool,
        at: DateTime<Utc>,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the task applying presence writes in submission order.
///
/// Failed writes are logged and dropped; they are never retried.
#[derive(Clone)]
pub struct PresenceWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl PresenceWriter {
    /// Spawn the writer task; it stops once every handle is dropped
    pub fn spawn(users: Arc<dyn UserDirectory>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(users, rx));
        (Self { tx }, task)
    }

    pub fn write(&self, user_id: UserId, online: bool, at: DateTime<Utc>) {
        if self
            .tx
            .send(WriterCommand::Write {
                user_id,
                online,
                at,
            })
            .is_err()
        {
            tracing::warn!(user_id = %user_id, online, "Presence writer stopped, write lost");
        }
    }

    /// Resolve `done` once every write submitted before it was attempted
    pub fn flush(&self, done: oneshot::Sender<()>) {
        // A stopped writer drops `done`, which the waiter also observes.
        let _ = self.tx.send(WriterCommand::Flush(done));
    }
}

async fn run(users: Arc<dyn UserDirectory>, mut rx: mpsc::UnboundedReceiver<WriterCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Write {
                user_id,
                online,
                at,
            } => {
                if let Err(e) = users.set_presence(user_id, online, at).await {
                    tracing::warn!(
                        user_id = %user_id,
                        online,
                        error = %e,
                        "Failed to record presence"
                    );
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Presence writer stopped");
}

impl std::fmt::Debug for PresenceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceWriter")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
