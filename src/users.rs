//! User accounts, presence, search, and search history.
//!
//! A `User` document carries everything the app tracks about an account:
//! credentials, presence, the friend-id list, both pending-request lists,
//! and the bounded search history. Friend entries are **id references
//! only** — name/email/presence are resolved against the live user record
//! at read time, so a friend renaming themselves can never leave a stale
//! snapshot behind.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth;
use crate::error::{Error, Result};
use crate::friends::FriendRequest;
use crate::store::Store;
use crate::time;

/// Maximum number of retained search-history entries.
pub const MAX_SEARCH_HISTORY: usize = 10;

/// Presence status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    /// Wire string for this presence value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Offline => "offline",
        }
    }

    /// Parse from a wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "online" => Some(Presence::Online),
            "offline" => Some(Presence::Offline),
            _ => None,
        }
    }
}

/// A user document. Never serialized directly — the credential hash stays
/// inside the store; API responses go through [`PublicProfile`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Display name, unique across the system.
    pub name: String,
    /// Email, unique across the system.
    pub email: String,
    /// Salted password hash (see [`crate::auth`]).
    pub password_hash: String,
    pub presence: Presence,
    /// When presence last changed (Unix millis).
    pub last_seen: i64,
    /// Friend ids. Symmetric: `a` lists `b` iff `b` lists `a`.
    pub friends: Vec<Uuid>,
    /// Pending requests where this user is the recipient.
    pub incoming_requests: Vec<FriendRequest>,
    /// Pending requests where this user is the sender.
    pub outgoing_requests: Vec<FriendRequest>,
    /// Most-recent-first, deduplicated, capped at [`MAX_SEARCH_HISTORY`].
    pub search_history: Vec<SearchEntry>,
    pub created_at: i64,
}

impl User {
    /// Create a fresh user document with empty relationship state.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            presence: Presence::Offline,
            last_seen: time::now_timestamp_millis(),
            friends: Vec::new(),
            incoming_requests: Vec::new(),
            outgoing_requests: Vec::new(),
            search_history: Vec::new(),
            created_at: time::now_timestamp_millis(),
        }
    }

    /// Check whether another user is in this user's friend list.
    pub fn is_friend(&self, other: &Uuid) -> bool {
        self.friends.contains(other)
    }
}

/// Public view of a user — what other users (and the owner) may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub presence: Presence,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            presence: user.presence,
        }
    }
}

/// A search-history entry: an identity plus the name/email shown in the
/// history dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Service for account management, presence, and search.
#[derive(Clone)]
pub struct UserService {
    store: Store,
}

impl UserService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ── Accounts ──────────────────────────────────────────────────────────

    /// Register a new user. Name and email must be unique.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation("Please add all fields".into()));
        }

        let user = User::new(
            name.trim().to_string(),
            email.trim().to_string(),
            auth::hash_password(password),
        );
        let created = user.clone();
        self.store.insert_user(user)?;
        Ok(created)
    }

    /// Verify login credentials. Wrong email and wrong password are
    /// indistinguishable to the caller.
    pub fn verify_login(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .store
            .find_user_by_email(email)
            .ok_or(Error::InvalidCredentials)?;
        if !auth::verify_password(password, &user.password_hash) {
            return Err(Error::InvalidCredentials);
        }
        Ok(user)
    }

    /// Fetch a user document by id.
    pub fn get(&self, id: &Uuid) -> Result<User> {
        self.store.get_user(id).ok_or(Error::UserNotFound)
    }

    // ── Presence ──────────────────────────────────────────────────────────

    /// Set the caller's presence and bump `last_seen`.
    pub fn set_presence(&self, id: &Uuid, presence: Presence) -> Result<User> {
        self.store
            .with_user_mut(id, |u| {
                u.presence = presence;
                u.last_seen = time::now_timestamp_millis();
                u.clone()
            })
            .ok_or(Error::UserNotFound)
    }

    /// Read another user's presence.
    pub fn presence_of(&self, id: &Uuid) -> Result<Presence> {
        Ok(self.get(id)?.presence)
    }

    // ── Search ────────────────────────────────────────────────────────────

    /// Case-insensitive substring search over name and email, excluding
    /// the caller. Full scan — the store indexes only exact keys.
    pub fn search(&self, caller: &Uuid, query: &str) -> Result<Vec<PublicProfile>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(Error::Validation("Search query is required".into()));
        }

        let mut matches: Vec<PublicProfile> = self
            .store
            .find_users(|u| {
                u.id != *caller
                    && (u.name.to_lowercase().contains(&query)
                        || u.email.to_lowercase().contains(&query))
            })
            .iter()
            .map(PublicProfile::from)
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    /// Read the caller's search history, most recent first.
    pub fn search_history(&self, id: &Uuid) -> Result<Vec<SearchEntry>> {
        Ok(self.get(id)?.search_history)
    }

    /// Record a searched-for user. Deduplicates by id (an existing entry
    /// moves to the front) and truncates to [`MAX_SEARCH_HISTORY`].
    pub fn push_search_history(&self, id: &Uuid, entry: SearchEntry) -> Result<Vec<SearchEntry>> {
        self.store
            .with_user_mut(id, |u| {
                u.search_history.retain(|e| e.id != entry.id);
                u.search_history.insert(0, entry);
                u.search_history.truncate(MAX_SEARCH_HISTORY);
                u.search_history.clone()
            })
            .ok_or(Error::UserNotFound)
    }

    // ── Friends List ──────────────────────────────────────────────────────

    /// Resolve the caller's friend ids against the live user records.
    /// Friends whose account vanished are skipped (accounts are never
    /// deleted today, so this is purely defensive reading).
    pub fn friends_list(&self, id: &Uuid) -> Result<Vec<PublicProfile>> {
        let user = self.get(id)?;
        Ok(user
            .friends
            .iter()
            .filter_map(|fid| self.store.get_user(fid))
            .map(|u| PublicProfile::from(&u))
            .collect())
    }
}
