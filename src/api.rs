//! HTTP API layer.
//!
//! Thin resource-oriented handlers over the user, friendship, and messaging
//! services. Authentication happens in the [`AuthUser`] extractor before
//! any handler body runs; handlers return typed JSON and surface failures
//! through [`Error`]'s status mapping.
//!
//! Reads are idempotent and side-effect free, so a client may poll the
//! conversation and presence endpoints on a fixed interval.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{AuthUser, TokenSigner};
use crate::error::{Error, Result};
use crate::friends::{FriendRequest, FriendsService};
use crate::messaging::{Message, MessagingService};
use crate::store::Store;
use crate::users::{Presence, PublicProfile, SearchEntry, User, UserService};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub users: UserService,
    pub friends: FriendsService,
    pub messaging: MessagingService,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenSigner) -> Self {
        Self {
            users: UserService::new(store.clone()),
            friends: FriendsService::new(store.clone()),
            messaging: MessagingService::new(store.clone()),
            store,
            tokens,
        }
    }
}

/// Build the application router. Middleware (CORS, tracing) is layered on
/// by the binary so tests can exercise the bare routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/me", get(me))
        .route("/api/users/status", put(update_status))
        .route("/api/users/status/:user_id", get(get_status))
        .route("/api/users/search", get(search))
        .route(
            "/api/users/search-history",
            get(get_search_history).put(put_search_history),
        )
        .route("/api/users/friends-list", get(friends_list))
        .route("/friend-requests/received", get(requests_received))
        .route("/friend-requests/sent", get(requests_sent))
        .route("/friend-request/send/:recipient_id", post(send_request))
        .route("/friend-request/accept/:request_id", put(accept_request))
        .route("/friend-request/reject/:request_id", put(reject_request))
        .route("/my-friends/remove/:friend_id", delete(unfriend))
        .route(
            "/chats/messages/:id",
            post(send_message).get(get_messages).delete(delete_message),
        )
        .route("/chats/messages/:recipient_id/read", put(mark_read))
        .route(
            "/chats/messages/:recipient_id/delivered",
            put(mark_delivered),
        )
        .with_state(state)
}

// ── Request / Response Bodies ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Returned by register and login: identity plus a fresh bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub presence: Presence,
    pub last_seen: i64,
    pub created_at: i64,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            presence: user.presence,
            last_seen: user.last_seen,
            created_at: user.created_at,
        }
    }
}

/// Presence is taken as a raw string and parsed by hand so an invalid
/// value yields a 400 with a clear message rather than a decode rejection.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Presence,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// A pending friend request with both endpoints resolved to live profiles.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestView {
    pub id: Uuid,
    pub sender: PublicProfile,
    pub recipient: PublicProfile,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DeliveredBody {
    pub message_ids: Vec<Uuid>,
}

/// Result of a bulk status update.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResult {
    pub modified: usize,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

// ── Health ────────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "banter",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Accounts ──────────────────────────────────────────────────────────────

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let user = state.users.register(&body.name, &body.email, &body.password)?;
    let token = state.tokens.issue(user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponse>> {
    let user = state.users.verify_login(&body.email, &body.password)?;
    let token = state.tokens.issue(user.id);
    Ok(Json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

async fn me(AuthUser(user): AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&user))
}

// ── Presence ──────────────────────────────────────────────────────────────

async fn get_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<StatusResponse>> {
    let presence = state.users.presence_of(&user_id)?;
    Ok(Json(StatusResponse { status: presence }))
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<StatusBody>,
) -> Result<Json<ProfileResponse>> {
    let presence = Presence::parse(&body.status)
        .ok_or_else(|| Error::Validation("Invalid status".into()))?;
    let updated = state.users.set_presence(&user.id, presence)?;
    Ok(Json(ProfileResponse::from(&updated)))
}

// ── Search ────────────────────────────────────────────────────────────────

async fn search(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PublicProfile>>> {
    let query = params.query.unwrap_or_default();
    Ok(Json(state.users.search(&user.id, &query)?))
}

async fn get_search_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<SearchEntry>>> {
    Ok(Json(state.users.search_history(&user.id)?))
}

async fn put_search_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(entry): Json<SearchEntry>,
) -> Result<Json<Vec<SearchEntry>>> {
    Ok(Json(state.users.push_search_history(&user.id, entry)?))
}

// ── Friends ───────────────────────────────────────────────────────────────

async fn friends_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<PublicProfile>>> {
    Ok(Json(state.users.friends_list(&user.id)?))
}

async fn requests_received(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<RequestView>>> {
    let requests = state.friends.incoming_requests(&user.id)?;
    Ok(Json(resolve_views(&state, &requests)))
}

async fn requests_sent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<RequestView>>> {
    let requests = state.friends.outgoing_requests(&user.id)?;
    Ok(Json(resolve_views(&state, &requests)))
}

async fn send_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(recipient_id): Path<Uuid>,
) -> Result<(StatusCode, Json<RequestView>)> {
    let request = state.friends.send_request(user.id, recipient_id)?;
    let view = request_view(&state, &request).ok_or(Error::UserNotFound)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn accept_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Ack>> {
    state.friends.accept_request(user.id, request_id)?;
    Ok(Ack::new("Friend request accepted"))
}

async fn reject_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Ack>> {
    state.friends.reject_request(user.id, request_id)?;
    Ok(Ack::new("Friend request rejected"))
}

async fn unfriend(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<Ack>> {
    state.friends.unfriend(user.id, friend_id)?;
    Ok(Ack::new("Friend removed from your friends list"))
}

fn resolve_views(state: &AppState, requests: &[FriendRequest]) -> Vec<RequestView> {
    requests
        .iter()
        .filter_map(|r| request_view(state, r))
        .collect()
}

fn request_view(state: &AppState, request: &FriendRequest) -> Option<RequestView> {
    let sender = state.store.get_user(&request.sender)?;
    let recipient = state.store.get_user(&request.recipient)?;
    Some(RequestView {
        id: request.id,
        sender: PublicProfile::from(&sender),
        recipient: PublicProfile::from(&recipient),
        created_at: request.created_at,
    })
}

// ── Messaging ─────────────────────────────────────────────────────────────

async fn send_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(recipient_id): Path<Uuid>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<Message>> {
    Ok(Json(state.messaging.send(user.id, recipient_id, &body.message)?))
}

async fn get_messages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(recipient_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>> {
    Ok(Json(state.messaging.conversation(user.id, recipient_id)?))
}

/// Mark everything the conversation partner sent to the caller as read.
async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(recipient_id): Path<Uuid>,
) -> Result<Json<UpdateResult>> {
    let modified = state.messaging.mark_read(user.id, recipient_id)?;
    Ok(Json(UpdateResult { modified }))
}

/// Mark specific messages as delivered. The path segment names the
/// conversation partner for route symmetry but the ids in the body drive
/// the update; only messages addressed to the caller are touched.
async fn mark_delivered(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(_recipient_id): Path<Uuid>,
    Json(body): Json<DeliveredBody>,
) -> Result<Json<UpdateResult>> {
    let modified = state.messaging.mark_delivered(user.id, &body.message_ids)?;
    Ok(Json(UpdateResult { modified }))
}

async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Ack>> {
    state.messaging.delete(user.id, message_id)?;
    Ok(Ack::new("Message deleted"))
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessageStatus;

    fn test_state() -> AppState {
        AppState::new(Store::new(), TokenSigner::new(b"test-secret".to_vec(), 3600))
    }

    async fn register_user(state: &AppState, name: &str) -> (User, AuthResponse) {
        let (status, Json(resp)) = register(
            State(state.clone()),
            Json(RegisterBody {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password: "hunter2".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let user = state.store.get_user(&resp.id).unwrap();
        (user, resp)
    }

    #[tokio::test]
    async fn test_register_login_me_flow() {
        let state = test_state();
        let (_, registered) = register_user(&state, "Alice").await;

        // The registration token is immediately usable.
        let user_id = state.tokens.verify(&registered.token).unwrap();
        assert_eq!(user_id, registered.id);

        let Json(logged_in) = login(
            State(state.clone()),
            Json(LoginBody {
                email: "alice@example.com".to_string(),
                password: "hunter2".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(logged_in.id, registered.id);

        let user = state.store.get_user(&registered.id).unwrap();
        let Json(profile) = me(AuthUser(user)).await;
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.presence, Presence::Offline);
    }

    #[tokio::test]
    async fn test_login_bad_password_unauthorized() {
        let state = test_state();
        register_user(&state, "Alice").await;

        let err = login(
            State(state.clone()),
            Json(LoginBody {
                email: "alice@example.com".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status_update_and_read() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let Json(profile) = update_status(
            State(state.clone()),
            AuthUser(bob.clone()),
            Json(StatusBody {
                status: "online".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(profile.presence, Presence::Online);

        let Json(status) = get_status(State(state.clone()), AuthUser(alice), Path(bob.id))
            .await
            .unwrap();
        assert_eq!(status.status, Presence::Online);
    }

    #[tokio::test]
    async fn test_status_rejects_unknown_value() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;

        let err = update_status(
            State(state.clone()),
            AuthUser(alice),
            Json(StatusBody {
                status: "away".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    // Scenario: A sends a request to B; B's incoming and A's outgoing
    // lists each contain exactly that edge.
    #[tokio::test]
    async fn test_send_request_visible_on_both_sides() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let (status, Json(view)) = send_request(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.sender.id, alice.id);
        assert_eq!(view.recipient.id, bob.id);

        let Json(received) = requests_received(State(state.clone()), AuthUser(bob.clone()))
            .await
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].sender.id, alice.id);

        let Json(sent) = requests_sent(State(state.clone()), AuthUser(alice.clone()))
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient.id, bob.id);
    }

    // Scenario: a second request while the first is pending is a conflict.
    #[tokio::test]
    async fn test_duplicate_request_conflict() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        send_request(State(state.clone()), AuthUser(alice.clone()), Path(bob.id))
            .await
            .unwrap();
        let err = send_request(State(state.clone()), AuthUser(alice), Path(bob.id))
            .await
            .unwrap_err();
        assert_eq!(err, Error::RequestPending);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    // Scenario: B accepts; both request lists drain and each user appears
    // in the other's friends list.
    #[tokio::test]
    async fn test_accept_flow_and_friends_list() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let (_, Json(view)) = send_request(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
        )
        .await
        .unwrap();

        accept_request(State(state.clone()), AuthUser(bob.clone()), Path(view.id))
            .await
            .unwrap();

        let Json(received) = requests_received(State(state.clone()), AuthUser(bob.clone()))
            .await
            .unwrap();
        assert!(received.is_empty());
        let Json(sent) = requests_sent(State(state.clone()), AuthUser(alice.clone()))
            .await
            .unwrap();
        assert!(sent.is_empty());

        let Json(alice_friends) =
            friends_list(State(state.clone()), AuthUser(alice.clone()))
                .await
                .unwrap();
        assert_eq!(alice_friends.len(), 1);
        assert_eq!(alice_friends[0].id, bob.id);

        let Json(bob_friends) = friends_list(State(state.clone()), AuthUser(bob))
            .await
            .unwrap();
        assert_eq!(bob_friends.len(), 1);
        assert_eq!(bob_friends[0].id, alice.id);
    }

    // Scenario: resolving the same request twice — second call is 404.
    #[tokio::test]
    async fn test_double_resolution_not_found() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let (_, Json(view)) = send_request(
            State(state.clone()),
            AuthUser(alice),
            Path(bob.id),
        )
        .await
        .unwrap();

        accept_request(State(state.clone()), AuthUser(bob.clone()), Path(view.id))
            .await
            .unwrap();
        let err = reject_request(State(state.clone()), AuthUser(bob), Path(view.id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    // Scenario: A sends "hi" to B; the conversation holds one `sent`
    // message; B marks it read; a repeat mark-read is a no-op.
    #[tokio::test]
    async fn test_message_flow_send_read_repeat() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let Json(sent) = send_message(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
            Json(SendMessageBody {
                message: "hi".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(sent.status, MessageStatus::Sent);
        assert_eq!(sent.text, "hi");

        let Json(conv) = get_messages(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
        )
        .await
        .unwrap();
        assert_eq!(conv.len(), 1);

        let Json(result) = mark_read(
            State(state.clone()),
            AuthUser(bob.clone()),
            Path(alice.id),
        )
        .await
        .unwrap();
        assert_eq!(result.modified, 1);

        let Json(result) = mark_read(State(state.clone()), AuthUser(bob.clone()), Path(alice.id))
            .await
            .unwrap();
        assert_eq!(result.modified, 0);

        let Json(conv) = get_messages(State(state.clone()), AuthUser(bob), Path(alice.id))
            .await
            .unwrap();
        assert_eq!(conv[0].status, MessageStatus::Read);
    }

    #[tokio::test]
    async fn test_mark_delivered_endpoint() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let Json(sent) = send_message(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
            Json(SendMessageBody {
                message: "hi".to_string(),
            }),
        )
        .await
        .unwrap();

        let Json(result) = mark_delivered(
            State(state.clone()),
            AuthUser(bob.clone()),
            Path(alice.id),
            Json(DeliveredBody {
                message_ids: vec![sent.id],
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.modified, 1);

        let Json(conv) = get_messages(State(state.clone()), AuthUser(bob), Path(alice.id))
            .await
            .unwrap();
        assert_eq!(conv[0].status, MessageStatus::Delivered);
    }

    // Scenario: unfriending empties both friend lists and the conversation.
    #[tokio::test]
    async fn test_unfriend_clears_friendship_and_history() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let (_, Json(view)) = send_request(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
        )
        .await
        .unwrap();
        accept_request(State(state.clone()), AuthUser(bob.clone()), Path(view.id))
            .await
            .unwrap();
        send_message(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
            Json(SendMessageBody {
                message: "hi".to_string(),
            }),
        )
        .await
        .unwrap();

        unfriend(State(state.clone()), AuthUser(alice.clone()), Path(bob.id))
            .await
            .unwrap();

        let Json(alice_friends) =
            friends_list(State(state.clone()), AuthUser(alice.clone()))
                .await
                .unwrap();
        assert!(alice_friends.is_empty());
        let Json(bob_friends) = friends_list(State(state.clone()), AuthUser(bob.clone()))
            .await
            .unwrap();
        assert!(bob_friends.is_empty());

        let Json(conv) = get_messages(State(state.clone()), AuthUser(alice), Path(bob.id))
            .await
            .unwrap();
        assert!(conv.is_empty());
    }

    #[tokio::test]
    async fn test_delete_message_authorization() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;
        let (carol, _) = register_user(&state, "Carol").await;

        let Json(sent) = send_message(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(bob.id),
            Json(SendMessageBody {
                message: "hi".to_string(),
            }),
        )
        .await
        .unwrap();

        let err = delete_message(State(state.clone()), AuthUser(carol), Path(sent.id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        delete_message(State(state.clone()), AuthUser(alice), Path(sent.id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_and_history_endpoints() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;
        let (bob, _) = register_user(&state, "Bob").await;

        let Json(results) = search(
            State(state.clone()),
            AuthUser(alice.clone()),
            Query(SearchParams {
                query: Some("bob".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, bob.id);

        let Json(history) = put_search_history(
            State(state.clone()),
            AuthUser(alice.clone()),
            Json(SearchEntry {
                id: bob.id,
                name: results[0].name.clone(),
                email: results[0].email.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(history.len(), 1);

        let Json(history) = get_search_history(State(state.clone()), AuthUser(alice))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, bob.id);
    }

    #[tokio::test]
    async fn test_search_without_query_is_bad_request() {
        let state = test_state();
        let (alice, _) = register_user(&state, "Alice").await;

        let err = search(
            State(state.clone()),
            AuthUser(alice),
            Query(SearchParams { query: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
