//! Friendship state machine.
//!
//! Governs the lifecycle of the relationship between two users and the side
//! effects that keep both user documents and their message history
//! consistent:
//!
//! ```text
//! Unrelated ──send_request──► RequestPending(sender) ──accept──► Friends
//!     ▲                            │                                │
//!     └──────────reject────────────┘                                │
//!     ◄──────────────────────unfriend (+ message purge)─────────────┘
//! ```
//!
//! Accept and reject are destructive: the request is removed from both
//! sides' lists, not retained as an audit record, so the second resolution
//! of the same request id fails with `RequestNotFound`.
//!
//! Every operation here mutates two user documents (and, for unfriend, the
//! pair's messages as well). Each runs under the store's per-pair lock, so
//! the symmetry invariant — A lists B iff B lists A — holds after every
//! call, even under concurrent conflicting requests on the same pair.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::time;

/// A directed, unresolved friend-request edge.
///
/// Requests are identified by their own id, not by the sender's identity,
/// so resolution never depends on a uniqueness side-invariant to be
/// well-defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: Uuid,
    pub sender: Uuid,
    pub recipient: Uuid,
    /// Unix millis.
    pub created_at: i64,
}

impl FriendRequest {
    fn new(sender: Uuid, recipient: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            recipient,
            created_at: time::now_timestamp_millis(),
        }
    }
}

/// Relationship state for an unordered user pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    /// No request and no friendship in either direction.
    Unrelated,
    /// A pending request exists; `sender` is who initiated it.
    RequestPending { sender: Uuid },
    /// The pair is friends.
    Friends,
}

/// Service for managing friend relationships.
#[derive(Clone)]
pub struct FriendsService {
    store: Store,
}

impl FriendsService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Send a friend request.
    ///
    /// Rejected when the recipient doesn't exist, when the pair is already
    /// friends, or when a pending request exists in *either* direction —
    /// a mutual request (B→A while A→B is pending) is a conflict, not an
    /// implicit acceptance.
    pub fn send_request(&self, sender: Uuid, recipient: Uuid) -> Result<FriendRequest> {
        if sender == recipient {
            return Err(Error::CannotAddSelf);
        }

        let lock = self.store.pair_lock(sender, recipient);
        let _guard = lock.lock();

        if !self.store.user_exists(&recipient) {
            return Err(Error::UserNotFound);
        }
        let sender_doc = self.store.get_user(&sender).ok_or(Error::UserNotFound)?;

        if sender_doc.is_friend(&recipient) {
            return Err(Error::AlreadyFriends);
        }
        let pending_out = sender_doc
            .outgoing_requests
            .iter()
            .any(|r| r.recipient == recipient);
        let pending_in = sender_doc
            .incoming_requests
            .iter()
            .any(|r| r.sender == recipient);
        if pending_out || pending_in {
            return Err(Error::RequestPending);
        }

        let request = FriendRequest::new(sender, recipient);

        self.store.with_user_mut(&recipient, |u| {
            u.incoming_requests.push(request.clone());
        });
        self.store.with_user_mut(&sender, |u| {
            u.outgoing_requests.push(request.clone());
        });

        tracing::info!(
            request_id = %request.id,
            sender = %sender,
            recipient = %recipient,
            "Friend request sent"
        );
        Ok(request)
    }

    /// Accept a pending request addressed to `caller`.
    ///
    /// Adds each user to the other's friend list and removes the request
    /// from both sides. Returns the new friend's id.
    pub fn accept_request(&self, caller: Uuid, request_id: Uuid) -> Result<Uuid> {
        let request = self.find_incoming(&caller, &request_id)?;

        let lock = self.store.pair_lock(caller, request.sender);
        let _guard = lock.lock();

        // Re-check under the lock: a concurrent accept/reject on the same
        // request may have resolved it between lookup and lock.
        let request = self.find_incoming(&caller, &request_id)?;
        let sender = request.sender;

        self.store.with_user_mut(&caller, |u| {
            u.incoming_requests.retain(|r| r.id != request_id);
            if !u.friends.contains(&sender) {
                u.friends.push(sender);
            }
        });
        self.store.with_user_mut(&sender, |u| {
            u.outgoing_requests.retain(|r| r.id != request_id);
            if !u.friends.contains(&caller) {
                u.friends.push(caller);
            }
        });

        tracing::info!(request_id = %request_id, sender = %sender, recipient = %caller, "Friend request accepted");
        Ok(sender)
    }

    /// Reject a pending request addressed to `caller`. Removes it from
    /// both sides' lists; no friendship is created.
    pub fn reject_request(&self, caller: Uuid, request_id: Uuid) -> Result<()> {
        let request = self.find_incoming(&caller, &request_id)?;

        let lock = self.store.pair_lock(caller, request.sender);
        let _guard = lock.lock();

        let request = self.find_incoming(&caller, &request_id)?;
        let sender = request.sender;

        self.store.with_user_mut(&caller, |u| {
            u.incoming_requests.retain(|r| r.id != request_id);
        });
        self.store.with_user_mut(&sender, |u| {
            u.outgoing_requests.retain(|r| r.id != request_id);
        });

        tracing::info!(request_id = %request_id, sender = %sender, recipient = %caller, "Friend request rejected");
        Ok(())
    }

    /// Dissolve a friendship.
    ///
    /// Removes the friend from the caller's list, repairs the other side
    /// if it still lists the caller, and deletes every message between the
    /// pair in either direction.
    pub fn unfriend(&self, caller: Uuid, friend: Uuid) -> Result<()> {
        let lock = self.store.pair_lock(caller, friend);
        let _guard = lock.lock();

        let caller_doc = self.store.get_user(&caller).ok_or(Error::UserNotFound)?;
        if !caller_doc.is_friend(&friend) {
            return Err(Error::NotFriends);
        }

        self.store.with_user_mut(&caller, |u| {
            u.friends.retain(|f| f != &friend);
        });
        // Symmetric repair: tolerate a one-sided list without failing.
        self.store.with_user_mut(&friend, |u| {
            u.friends.retain(|f| f != &caller);
        });

        let purged = self.store.delete_pair_messages(caller, friend);

        tracing::info!(
            caller = %caller,
            friend = %friend,
            messages_purged = purged,
            "Friendship dissolved"
        );
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Pending requests addressed to `caller`.
    pub fn incoming_requests(&self, caller: &Uuid) -> Result<Vec<FriendRequest>> {
        Ok(self
            .store
            .get_user(caller)
            .ok_or(Error::UserNotFound)?
            .incoming_requests)
    }

    /// Pending requests sent by `caller`.
    pub fn outgoing_requests(&self, caller: &Uuid) -> Result<Vec<FriendRequest>> {
        Ok(self
            .store
            .get_user(caller)
            .ok_or(Error::UserNotFound)?
            .outgoing_requests)
    }

    /// Current relationship state for a pair.
    pub fn pair_state(&self, a: &Uuid, b: &Uuid) -> PairState {
        let Some(doc) = self.store.get_user(a) else {
            return PairState::Unrelated;
        };
        if doc.is_friend(b) {
            return PairState::Friends;
        }
        if doc.outgoing_requests.iter().any(|r| r.recipient == *b) {
            return PairState::RequestPending { sender: *a };
        }
        if doc.incoming_requests.iter().any(|r| r.sender == *b) {
            return PairState::RequestPending { sender: *b };
        }
        PairState::Unrelated
    }

    fn find_incoming(&self, caller: &Uuid, request_id: &Uuid) -> Result<FriendRequest> {
        self.store
            .get_user(caller)
            .ok_or(Error::UserNotFound)?
            .incoming_requests
            .iter()
            .find(|r| r.id == *request_id && r.recipient == *caller)
            .cloned()
            .ok_or(Error::RequestNotFound)
    }
}
