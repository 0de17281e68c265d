use super::game::service_error;
use crate::events::{EventBus, EventSubscription, GameEvent};
use crate::games::GameManager;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use warp::http;
use warp::reply::{self, Response};
use warp::sse;
use warp::Reply;

/// Streams a game's events as server-sent events. The first event is a
/// `state_updated` snapshot of the record at subscription time; the stream
/// ends when the game is deleted.
pub async fn stream_events(
    game_id: String,
    games: Arc<GameManager>,
    event_bus: Arc<EventBus>,
) -> Response {
    let state = match games.get_game(&game_id) {
        Ok(state) => state,
        Err(err) => return service_error(err),
    };

    let subscription = event_bus.subscribe(game_id);
    let snapshot = tokio_stream::once(GameEvent::state_updated(&state));
    let stream = snapshot
        .chain(subscription_stream(subscription))
        .map(|event| Ok::<_, Infallible>(render_event(&event)));
    let keep_alive = sse::keep_alive()
        .interval(Duration::from_secs(15))
        .text(":keep-alive\n");

    let reply = sse::reply(keep_alive.stream(stream));
    reply::with_header(reply, http::header::CACHE_CONTROL, "no-cache").into_response()
}

/// Moves the receiver out of the subscription; the subscription itself rides
/// along with the stream so dropping the stream unsubscribes.
fn subscription_stream(mut subscription: EventSubscription) -> impl Stream<Item = GameEvent> {
    let (_, placeholder) = mpsc::channel(1);
    let receiver = std::mem::replace(&mut subscription.receiver, placeholder);
    ReceiverStream::new(receiver).map(move |event| {
        let _held = &subscription;
        event
    })
}

pub(crate) fn render_event(event: &GameEvent) -> sse::Event {
    let event_type = event.kind();
    match serde_json::to_string(event) {
        Ok(json) => sse::Event::default().event(event_type).data(json),
        Err(err) => {
            let fallback = serde_json::json!({
                "type": "error",
                "message": format!("failed to serialize game event: {err}")
            })
            .to_string();
            sse::Event::default().event("error").data(fallback)
        }
    }
}
