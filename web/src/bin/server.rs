//! Gatherly server.
//!
//! Runs the coordination engine behind the Axum surface with the
//! in-memory store, seeds one user per role, and logs a bearer token
//! for each so the API is usable immediately.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use gatherly_core::model::{NewUser, Role};
use gatherly_core::store::{InMemoryStore, RecordStore};
use gatherly_core::verifier::{Identity, SignedTokenVerifier};
use gatherly_web::{AppState, Config, build_router};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("{},gatherly_web=debug,gatherly_core=debug", config.server.log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gatherly server...");

    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
    let hub = Arc::new(gatherly_core::broadcast::BroadcastHub::new());
    let verifier = Arc::new(SignedTokenVerifier::new(config.auth.token_secret.as_bytes()));

    seed_users(store.as_ref(), &verifier).await?;

    let state = AppState::new(store, hub, verifier);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Gatherly server is running");
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down gracefully...");
        })
        .await?;

    Ok(())
}

/// Seed one user per role and log a usable bearer token for each.
async fn seed_users(
    store: &dyn RecordStore,
    verifier: &SignedTokenVerifier,
) -> Result<(), Box<dyn std::error::Error>> {
    for (email, role) in [
        ("admin@gatherly.dev", Role::Admin),
        ("organizer@gatherly.dev", Role::Organizer),
        ("attendee@gatherly.dev", Role::Attendee),
    ] {
        let user = store
            .create_user(NewUser {
                email: email.to_string(),
                role,
            })
            .await?;
        let token = verifier.issue(&Identity {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        })?;
        tracing::info!(email = %user.email, role = %user.role, token = %token, "Seeded user");
    }
    Ok(())
}
