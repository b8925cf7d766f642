//! Session change notifications

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::domain::user::UserId;

/// Channel capacity; slow listeners lose the oldest events
pub const SESSION_EVENT_CAPACITY: usize = 64;

/// A change in some user's session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedUp { user_id: UserId },
    SignedIn { user_id: UserId },
    SignedOut { user_id: UserId },
}

impl SessionEvent {
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::SignedUp { user_id } | Self::SignedIn { user_id } | Self::SignedOut { user_id } => {
                user_id
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedUp { .. } => "signed_up",
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut { .. } => "signed_out",
        }
    }
}

/// Log every session event until the channel closes
pub async fn log_session_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                info!(event = event.name(), user_id = %event.user_id(), "Session changed");
                metrics::counter!("session_events_total", "event" => event.name()).increment(1);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped = skipped, "Session event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
