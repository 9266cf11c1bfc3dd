//! Banter server binary.
//!
//! Wires the in-memory store, token signer, and HTTP router together and
//! serves the API over plain HTTP. All state lives in process memory; a
//! restart starts from an empty store.

use clap::Parser;
use rand::RngCore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use banter::api::{self, AppState};
use banter::auth::TokenSigner;
use banter::store::Store;

#[derive(Parser, Debug)]
#[command(name = "banter-server", about = "Banter chat server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "BANTER_PORT")]
    port: u16,

    /// Secret used to sign bearer tokens. If unset, a random secret is
    /// generated at startup and all tokens die with the process.
    #[arg(long, env = "BANTER_TOKEN_SECRET")]
    token_secret: Option<String>,

    /// Bearer token lifetime in seconds
    #[arg(long, default_value = "2592000", env = "BANTER_TOKEN_TTL_SECS")]
    token_ttl_secs: i64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let secret = match args.token_secret {
        Some(secret) => secret.into_bytes(),
        None => {
            tracing::warn!(
                "No token secret configured; using a random one — tokens will not survive a restart"
            );
            let mut secret = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut secret);
            secret
        }
    };

    let state = AppState::new(Store::new(), TokenSigner::new(secret, args.token_ttl_secs));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    tracing::info!(addr = %addr, "Banter server listening");

    axum::serve(listener, app).await.expect("Server error");
}
