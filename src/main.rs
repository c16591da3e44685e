mod bot;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use discord_interactions::config::Settings;
use discord_interactions::discord::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use discord_interactions::{ApplicationOptions, BotError, DiscordApplication, ErrorKind, Result};

async fn run() -> Result<()> {
    let settings = Settings::from_env()?;

    let mut options = ApplicationOptions::new(&settings.client_id, settings.public_key.as_str(), &settings.token);
    options.overwrite_existing = settings.overwrite_existing;
    options.remove_unregistered = settings.remove_unregistered;
    options.timeout = Some(settings.timeout());
    options.commands = bot::commands();
    options.components = bot::components();

    let app = Arc::new(DiscordApplication::new(options)?);
    let router = Router::new()
        .route("/interactions", post(interactions))
        .with_state(app.clone());

    let listener = TcpListener::bind(settings.bind_addr.as_str()).await?;
    info!(
        addr = %settings.bind_addr,
        client_id = app.client_id(),
        commands = app.dispatcher().commands().len(),
        "interactions endpoint listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}

async fn interactions(State(app): State<Arc<DiscordApplication>>, headers: HeaderMap, body: Bytes) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let timestamp = header(TIMESTAMP_HEADER);
    let signature = header(SIGNATURE_HEADER);

    match app.handle_interaction(&timestamp, &signature, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                e.log_tree();
                return status.into_response();
            }
            debug!(key = e.key, %status, "interaction rejected");
            (status, e.key).into_response()
        }
    }
}

/// Caller mistakes are 4xx; everything else is on this side.
fn error_status(e: &BotError) -> StatusCode {
    if e.is(ErrorKind::VerificationFailed) {
        StatusCode::UNAUTHORIZED
    } else if e.is(ErrorKind::MalformedInteraction) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Discord interactions service (starting)");

    if let Err(e) = run().await {
        e.log_tree();
        std::process::exit(1);
    }
}
