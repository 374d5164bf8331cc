//! Member lifecycle events shared between the profile editor, administration,
//! and directory views.
//!
//! Events travel over an explicit broadcast channel: producers publish through
//! a [`MemberEventHub`] handle and each dependent view owns its own receiver.

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::member::{Member, MemberId};

/// Default number of events buffered per receiver before lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Member lifecycle domain events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberEvent {
    /// A member edited their profile; carries the stored member.
    ProfileUpdated(Member),
    /// An administrator changed a member's approval state.
    StateChanged(Member),
    /// An administrator deleted a member.
    Deleted(MemberId),
}

/// Cloneable publisher handle for member events.
#[derive(Debug, Clone)]
pub struct MemberEventHub {
    sender: broadcast::Sender<MemberEvent>,
}

impl Default for MemberEventHub {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl MemberEventHub {
    /// Create a hub buffering `capacity` events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new receiver. Only events published afterwards are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<MemberEvent> {
        self.sender.subscribe()
    }

    /// Publish an event and return the number of receivers it reached.
    pub fn publish(&self, event: MemberEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "member event published without subscribers");
                0
            }
        }
    }
}
