//! Direct messaging between users.
//!
//! Messages are append-only per-pair records with a tri-state delivery
//! status that only ever advances:
//!
//! ```text
//! sent ──► delivered ──► read
//! ```
//!
//! No backward transitions, no branch states; deletion is a terminal exit
//! from any state. Bulk status updates are restricted to messages addressed
//! to the caller and are no-ops (not errors) when nothing matches, which
//! makes them safe for a client to call on a polling interval.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::time;

/// Message delivery status. Ordered: later states outrank earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Stored on the server, not yet fetched by the recipient.
    Sent,
    /// The recipient's client has fetched the message.
    Delivered,
    /// The recipient has seen the message.
    Read,
}

impl MessageStatus {
    /// Wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }

    /// Position in the `sent → delivered → read` progression.
    fn rank(&self) -> u8 {
        match self {
            MessageStatus::Sent => 0,
            MessageStatus::Delivered => 1,
            MessageStatus::Read => 2,
        }
    }
}

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub text: String,
    pub status: MessageStatus,
    /// Unix millis.
    pub created_at: i64,
    /// Unix millis; bumped on every status change.
    pub updated_at: i64,
}

impl Message {
    /// Create a new message with status `sent`.
    pub fn new(sender_id: Uuid, recipient_id: Uuid, text: String) -> Self {
        let now = time::now_timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            text,
            status: MessageStatus::Sent,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance the status if `to` is further along the progression.
    /// Returns whether anything changed; a regression is silently ignored.
    pub fn advance_status(&mut self, to: MessageStatus) -> bool {
        if to.rank() > self.status.rank() {
            self.status = to;
            self.updated_at = time::now_timestamp_millis();
            true
        } else {
            false
        }
    }
}

/// Service for sending, listing, and resolving messages.
#[derive(Clone)]
pub struct MessagingService {
    store: Store,
}

impl MessagingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Send a message. The recipient must exist and the text must be
    /// non-empty. Friendship is not required to send — unfriending purges
    /// the history, but a fresh conversation can start without a request.
    pub fn send(&self, sender: Uuid, recipient: Uuid, text: &str) -> Result<Message> {
        if text.trim().is_empty() {
            return Err(Error::Validation("Text is required".into()));
        }
        if !self.store.user_exists(&recipient) {
            return Err(Error::UserNotFound);
        }

        let message = Message::new(sender, recipient, text.to_string());
        self.store.insert_message(message.clone());

        tracing::debug!(
            message_id = %message.id,
            sender = %sender,
            recipient = %recipient,
            "Message stored"
        );
        Ok(message)
    }

    /// All messages between the caller and `other`, in either direction,
    /// oldest first. Pure read — safe to poll.
    pub fn conversation(&self, caller: Uuid, other: Uuid) -> Result<Vec<Message>> {
        Ok(self.store.conversation(caller, other))
    }

    /// Mark the given messages as delivered, restricted to messages
    /// addressed to the caller. Monotonic: a `read` message stays `read`.
    /// Returns how many messages actually changed.
    pub fn mark_delivered(&self, caller: Uuid, message_ids: &[Uuid]) -> Result<usize> {
        if message_ids.is_empty() {
            return Err(Error::Validation("Message IDs are required".into()));
        }
        let modified = self.store.update_messages(
            |m| m.recipient_id == caller && message_ids.contains(&m.id),
            |m| m.advance_status(MessageStatus::Delivered),
        );
        Ok(modified)
    }

    /// Mark every message from `sender` to the caller as read. Monotonic
    /// and idempotent — repeat calls are no-ops. Returns how many messages
    /// actually changed.
    pub fn mark_read(&self, caller: Uuid, sender: Uuid) -> Result<usize> {
        let modified = self.store.update_messages(
            |m| m.sender_id == sender && m.recipient_id == caller,
            |m| m.advance_status(MessageStatus::Read),
        );
        Ok(modified)
    }

    /// Permanently delete a single message. Only the sender or the
    /// recipient may delete it.
    pub fn delete(&self, caller: Uuid, message_id: Uuid) -> Result<()> {
        let message = self
            .store
            .get_message(&message_id)
            .ok_or(Error::MessageNotFound)?;
        if message.sender_id != caller && message.recipient_id != caller {
            return Err(Error::Forbidden);
        }
        self.store.remove_message(&message_id);

        tracing::debug!(message_id = %message_id, caller = %caller, "Message deleted");
        Ok(())
    }
}
