use crate::connection::{Connection, Delivery};
use crate::protocol::ServerEvent;
use chat_core::ConnectionId;
use std::sync::Arc;

/// Deliver `event` to every target; returns how many queues accepted it.
///
/// Targets must be a snapshot taken with no registry or room lock held.
pub fn deliver_to(targets: &[Arc<Connection>], event: &ServerEvent) -> usize {
    targets
        .iter()
        .filter(|target| target.deliver(event.clone()) == Delivery::Queued)
        .count()
}

/// Like [`deliver_to`], skipping the connection `except`
pub fn deliver_except(
    targets: &[Arc<Connection>],
    except: ConnectionId,
    event: &ServerEvent,
) -> usize {
    targets
        .iter()
        .filter(|target| target.id() != except)
        .filter(|target| target.deliver(event.clone()) == Delivery::Queued)
        .count()
}
