//! HTTP receiver for GitHub webhook notifications.
//!
//! Accepts `POST /webhook/github`, records the body and the
//! `X-GitHub-Event` header in the event store, and answers with a small
//! JSON status. There is no signature verification.

use crate::error::{Error, Result};
use crate::events::{Event, EventStore};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub use crate::config::WEBHOOK_PATH;

/// Header carrying the event type.
pub const EVENT_HEADER: &str = "x-github-event";

/// Largest request body accepted. GitHub caps webhook payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the receiver's router.
pub fn router(store: Arc<EventStore>) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(receive_webhook))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(store)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: &str, store: Arc<EventStore>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(
        url = %format!("http://{local}{WEBHOOK_PATH}"),
        events_file = %store.path().display(),
        "webhook server listening"
    );

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("webhook server stopped");
    Ok(())
}

async fn receive_webhook(
    State(store): State<Arc<EventStore>>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<Value>) {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let message = rejection.body_text();
            tracing::warn!(error = %message, "could not read webhook body");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message })));
        }
    };
    let raw = String::from_utf8_lossy(&body).into_owned();
    let event_type =
        headers.get(EVENT_HEADER).map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    tracing::info!(
        event_type = event_type.as_deref().unwrap_or("-"),
        bytes = body.len(),
        "webhook received"
    );

    let payload: Value = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            let err = Error::MalformedPayload(e);
            tracing::warn!(error = %err, "rejected webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string(), "body_received": raw })),
            );
        }
    };

    let event = Event::received(event_type.as_deref(), payload);
    let outcome = tokio::task::spawn_blocking(move || store.append(event)).await;

    let message = match outcome {
        Ok(Ok(())) => return (StatusCode::OK, Json(json!({ "status": "received" }))),
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
    };
    tracing::error!(error = %message, "failed to store webhook event");
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}
