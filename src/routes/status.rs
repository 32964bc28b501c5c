//! Queue position feed
//!
//! Server-sent events stream reporting a request's queue position once per
//! poll interval until the request is dequeued. The final event carries `0`
//! ("your turn") and the stream closes. While the stream is open the request
//! id is held in the live-notifier set, which shields it from the reaper;
//! dropping the stream (client disconnect included) releases it.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use uuid::Uuid;

use crate::admission::{AdmissionQueue, NotifierGuard};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StatusParams {
    pub request_id: Uuid,
}

struct PositionFeed {
    guard: NotifierGuard,
    queue: AdmissionQueue,
    poll: Duration,
    started: bool,
    done: bool,
}

/// GET /queueStatus?request_id=<id>
///
/// A never-uploaded or already-dequeued id yields the terminal `0` event
/// immediately.
pub async fn queue_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let feed = PositionFeed {
        guard: state.notifiers().register(params.request_id),
        queue: state.queue().clone(),
        poll: state.config().queue.notifier_poll,
        started: false,
        done: false,
    };

    tracing::debug!(request_id = %params.request_id, "Position feed opened");

    let stream = stream::unfold(feed, |mut feed| async move {
        if feed.done {
            return None;
        }
        // Emit immediately on open, then once per poll interval. The sleep
        // is dropped with the stream, so a disconnect cancels it promptly.
        if feed.started {
            tokio::time::sleep(feed.poll).await;
        } else {
            feed.started = true;
        }

        let event = match feed.queue.position(feed.guard.id()) {
            Some(position) => Event::default().data(position.to_string()),
            None => {
                feed.done = true;
                Event::default().data("0")
            }
        };

        Some((Ok(event), feed))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
