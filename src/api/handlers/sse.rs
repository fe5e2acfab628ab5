use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

pub(crate) async fn sse_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.event_hub.subscribe();

    // Lagged receivers skip what they missed; clients re-sync from /api/results.
    let stream =
        BroadcastStream::new(rx).filter_map(
            |result: Result<crate::events::Event, _>| match result {
                Ok(event) => {
                    let event_type = event.event_type();
                    serde_json::to_string(&event)
                        .ok()
                        .map(|json| Ok(SseEvent::default().event(event_type).data(json)))
                }
                Err(_) => None,
            },
        );

    Sse::new(stream).keep_alive(KeepAlive::default())
}
