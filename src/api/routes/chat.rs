use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::application::TurnEvent;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Streams one chat turn as server-sent events: `delta` events while the
/// answer grows, then `completed` with the committed message, or `error` if
/// the turn was abandoned. The session stays locked for the whole turn; a
/// concurrent turn on the same session gets 409.
pub async fn chat_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    axum::Json(request): axum::Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    let guard = session
        .try_lock_owned()
        .map_err(|_| StatusCode::CONFLICT)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let (done_tx, done_rx) = oneshot::channel();
    let chat = state.chat.clone();

    tokio::spawn(async move {
        let mut guard = guard;
        let result = chat.process_turn(&mut guard, &request.message, &tx).await;
        drop(tx);
        let _ = done_tx.send(result.err().map(|e| e.to_string()));
    });

    let events = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
    .map(|event| Ok(to_sse_event(event)));

    let tail = futures::stream::once(async move {
        match done_rx.await {
            Ok(Some(error)) => Some(Ok(Event::default().event("error").data(error))),
            _ => None,
        }
    })
    .filter_map(|event| async move { event });

    Ok(Sse::new(events.chain(tail)).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: TurnEvent) -> Event {
    match event {
        TurnEvent::Delta(delta) => Event::default().event("delta").data(delta),
        TurnEvent::Completed(message) => {
            match Event::default().event("completed").json_data(&message) {
                Ok(event) => event,
                Err(e) => Event::default().event("error").data(e.to_string()),
            }
        }
    }
}
