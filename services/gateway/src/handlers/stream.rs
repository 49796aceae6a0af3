use std::convert::Infallible;

use auction_engine::events::AuctionEvent;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::state::AppState;
use types::ids::AuctionId;

/// SSE feed of one auction's round and lifecycle events.
///
/// Subscribes to the engine broadcast channel and forwards matching
/// events. A lagged receiver skips the overwritten backlog and keeps
/// streaming; clients needing the gap re-read the auction record.
pub async fn auction_events(
    State(state): State<AppState>,
    Path(id): Path<AuctionId>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.registry.get(id).is_none() {
        return Err(AppError::NotFound(id));
    }

    let rx = state.events.subscribe();
    let stream = stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if event.auction_id() != id {
                        continue;
                    }
                    match sse_event(&event) {
                        Ok(out) => return Some((Ok::<_, Infallible>(out), rx)),
                        Err(err) => {
                            tracing::error!(error = %err, "failed to encode auction event");
                            continue;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn sse_event(event: &AuctionEvent) -> Result<Event, axum::Error> {
    Event::default().event(event.name()).json_data(event)
}
