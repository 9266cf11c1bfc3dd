//! # Banter
//!
//! A minimal social-chat server: user registration/login, a friend-request
//! workflow, a friends list, and direct messaging with delivery/read status.
//!
//! The interesting part is the friendship state machine and its cross-entity
//! invariants:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                 FRIENDSHIP STATE MACHINE                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │                                                               │
//! │              send_request                accept_request       │
//! │  Unrelated ───────────────► RequestPending ──────────► Friends│
//! │      ▲                           │                        │   │
//! │      │       reject_request      │                        │   │
//! │      ◄───────────────────────────┘                        │   │
//! │      │                     unfriend                       │   │
//! │      ◄────────────────────────────────────────────────────┘   │
//! │                     (deletes every message for the pair)      │
//! │                                                               │
//! │  Invariants:                                                  │
//! │  • At most one pending request per user pair.                 │
//! │  • A is in B's friend list iff B is in A's friend list.       │
//! │  • After unfriend, no message exists for the pair.            │
//! │                                                               │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation that touches two user documents (send/accept/reject a
//! request, unfriend) runs under a per-pair lock so the symmetric invariants
//! can never be observed half-applied. Message status advances monotonically
//! (`sent → delivered → read`) and never regresses.

pub mod api;
pub mod auth;
pub mod error;
pub mod friends;
pub mod messaging;
pub mod store;
pub mod time;
pub mod users;

pub use error::{Error, Result};
pub use store::Store;
