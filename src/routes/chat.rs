use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    error::AppError,
    message::{CancelResponse, ChatAccepted, ChatRequest},
    services::chat_session::{CHAT_UNAVAILABLE_MESSAGE, ChatSnapshot, IgnoreReason},
    state::SharedState,
};

pub async fn snapshot_handler(State(state): State<SharedState>) -> Json<ChatSnapshot> {
    Json(state.chat.snapshot())
}

pub async fn open_handler(State(state): State<SharedState>) -> Json<ChatSnapshot> {
    state.chat.open();
    Json(state.chat.snapshot())
}

pub async fn close_handler(State(state): State<SharedState>) -> StatusCode {
    state.chat.close();
    StatusCode::NO_CONTENT
}

pub async fn send_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<(StatusCode, Json<ChatAccepted>), AppError> {
    let pending = state.chat.begin(&payload.message).map_err(|reason| match reason {
        IgnoreReason::EmptyMessage => AppError::BadRequest("Message cannot be empty".to_string()),
        IgnoreReason::Busy => AppError::Conflict("a reply is still streaming".to_string()),
        IgnoreReason::Unavailable => AppError::Conflict(CHAT_UNAVAILABLE_MESSAGE.to_string()),
    })?;
    let placeholder_id = pending.placeholder();

    // The reply streams in the background; clients follow it on /events.
    let chat_state = state.clone();
    tokio::spawn(async move {
        let outcome = chat_state.chat.complete(pending).await;
        tracing::info!(?outcome, "chat reply finished");
    });

    Ok((StatusCode::ACCEPTED, Json(ChatAccepted { placeholder_id })))
}

pub async fn cancel_handler(State(state): State<SharedState>) -> Json<CancelResponse> {
    Json(CancelResponse { cancelled: state.chat.cancel() })
}

pub async fn events_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.chat.subscribe();
    let events = stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event = Event::default()
                        .json_data(&event)
                        .unwrap_or_else(|_| Event::default().data("{}"));
                    yield Ok::<Event, Infallible>(event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "chat event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(events).keep_alive(KeepAlive::default())
}
