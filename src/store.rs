//! In-memory document store.
//!
//! Holds the two record types (`User`, `Message`) in concurrent maps
//! (DashMap) behind a cloneable handle, plus the per-pair locks that
//! serialize every cross-document mutation.
//!
//! Single-document updates are atomic on their own (the map shard guards
//! the document). Anything that touches *two* user documents — or a user
//! pair plus its messages — must hold the pair's lock so the symmetric
//! friendship invariants can never be observed half-applied.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::messaging::Message;
use crate::users::User;

/// Lock key for an *unordered* user pair: the two ids are sorted so
/// (A, B) and (B, A) map to the same lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(Uuid, Uuid);

impl PairKey {
    /// Build the canonical key for a pair, regardless of argument order.
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Shared store handle. Cheap to clone; all clones see the same data.
#[derive(Clone, Default)]
pub struct Store {
    /// User id → user document.
    users: Arc<DashMap<Uuid, User>>,
    /// Lowercased email → user id (unique index).
    email_index: Arc<DashMap<String, Uuid>>,
    /// Lowercased display name → user id (unique index).
    name_index: Arc<DashMap<String, Uuid>>,
    /// Message id → message document.
    messages: Arc<DashMap<Uuid, Message>>,
    /// Unordered pair → mutex serializing cross-document mutations.
    pair_locks: Arc<DashMap<PairKey, Arc<Mutex<()>>>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Users ─────────────────────────────────────────────────────────────

    /// Insert a new user, enforcing the unique email and name indexes.
    pub fn insert_user(&self, user: User) -> Result<()> {
        let email_key = user.email.to_lowercase();
        let name_key = user.name.to_lowercase();

        match self.email_index.entry(email_key.clone()) {
            Entry::Occupied(_) => return Err(Error::EmailTaken),
            Entry::Vacant(entry) => {
                entry.insert(user.id);
            }
        }
        match self.name_index.entry(name_key) {
            Entry::Occupied(_) => {
                // Roll back the email claim so a retry with another name works.
                self.email_index.remove(&email_key);
                return Err(Error::NameTaken);
            }
            Entry::Vacant(entry) => {
                entry.insert(user.id);
            }
        }

        tracing::info!(user_id = %user.id, name = user.name.as_str(), "User created");
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Fetch a user document by id.
    pub fn get_user(&self, id: &Uuid) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    /// Check whether a user exists.
    pub fn user_exists(&self, id: &Uuid) -> bool {
        self.users.contains_key(id)
    }

    /// Look up a user by email (case-insensitive).
    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let id = *self.email_index.get(&email.to_lowercase())?;
        self.get_user(&id)
    }

    /// Look up a user by display name (case-insensitive).
    pub fn find_user_by_name(&self, name: &str) -> Option<User> {
        let id = *self.name_index.get(&name.to_lowercase())?;
        self.get_user(&id)
    }

    /// Update a user document in place. Returns `None` if the user does
    /// not exist. The closure runs while the document's shard is held, so
    /// keep it short and never touch another document from inside it.
    pub fn with_user_mut<R>(&self, id: &Uuid, f: impl FnOnce(&mut User) -> R) -> Option<R> {
        self.users.get_mut(id).map(|mut u| f(&mut u))
    }

    /// Collect users matching a predicate. Full scan — fine at this scale.
    pub fn find_users(&self, mut pred: impl FnMut(&User) -> bool) -> Vec<User> {
        self.users
            .iter()
            .filter(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // ── Pair Locks ────────────────────────────────────────────────────────

    /// Get (or create) the lock serializing mutations for a user pair.
    /// Callers hold the guard for the whole cross-document operation.
    ///
    /// The table keeps one entry per pair ever locked and never reclaims
    /// them. A mutex entry is a few dozen bytes against a user document
    /// that also lives forever, so eviction would buy nothing until
    /// account deletion exists.
    pub fn pair_lock(&self, a: Uuid, b: Uuid) -> Arc<Mutex<()>> {
        self.pair_locks
            .entry(PairKey::new(a, b))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ── Messages ──────────────────────────────────────────────────────────

    /// Insert a message document.
    pub fn insert_message(&self, message: Message) {
        self.messages.insert(message.id, message);
    }

    /// Fetch a message by id.
    pub fn get_message(&self, id: &Uuid) -> Option<Message> {
        self.messages.get(id).map(|m| m.clone())
    }

    /// Permanently remove a message. Returns the removed document.
    pub fn remove_message(&self, id: &Uuid) -> Option<Message> {
        self.messages.remove(id).map(|(_, m)| m)
    }

    /// All messages between a pair, in either direction, oldest first.
    pub fn conversation(&self, a: Uuid, b: Uuid) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .map(|m| m.clone())
            .collect();
        // Millisecond timestamps can collide; the id tie-break keeps the
        // ordering deterministic.
        messages.sort_by(|x, y| {
            x.created_at
                .cmp(&y.created_at)
                .then_with(|| x.id.cmp(&y.id))
        });
        messages
    }

    /// Delete every message between a pair, in either direction.
    /// Returns the number of messages removed.
    pub fn delete_pair_messages(&self, a: Uuid, b: Uuid) -> usize {
        let ids: Vec<Uuid> = self
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .map(|m| m.id)
            .collect();

        for id in &ids {
            self.messages.remove(id);
        }
        ids.len()
    }

    /// Apply an update to every message matching the predicate. Returns
    /// how many messages the closure reported as modified.
    pub fn update_messages(
        &self,
        mut pred: impl FnMut(&Message) -> bool,
        mut update: impl FnMut(&mut Message) -> bool,
    ) -> usize {
        let mut modified = 0;
        for mut entry in self.messages.iter_mut() {
            if pred(entry.value()) && update(entry.value_mut()) {
                modified += 1;
            }
        }
        modified
    }

    /// Total number of stored messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
