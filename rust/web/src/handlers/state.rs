//! The raw replication endpoints: clients that run the rules themselves read
//! and write whole game records here.

use super::game::{service_error, success_response};
use crate::games::{GameManager, GameServiceError};
use crate::store::StoreError;
use cardparty_engine::game::GameState;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;

/// - **Method**: GET
/// - **Path**: `/game/{gameId}`
///
/// Responds with the stored record, or 404 `game_not_found`.
pub async fn get_state(games: Arc<GameManager>, game_id: String) -> Response {
    match games.get_game(&game_id) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => service_error(err),
    }
}

/// Replaces the stored record with the body.
///
/// - **Method**: PUT or POST
/// - **Path**: `/game/{gameId}`
///
/// The body's `version` must be the version it was derived from. Responds
/// 200 with the stored copy (its version bumped by one); 400
/// `malformed_state` for unreadable or inconsistent records; 409
/// `version_conflict` or `game_finished`.
pub async fn put_state(games: Arc<GameManager>, game_id: String, body: Bytes) -> Response {
    let state: GameState = match serde_json::from_slice(&body) {
        Ok(state) => state,
        Err(err) => {
            return service_error(GameServiceError::Store(StoreError::MalformedState(
                err.to_string(),
            )))
        }
    };
    match games.replace_state(&game_id, state) {
        Ok(stored) => {
            games.schedule_automated_turns(&game_id);
            success_response(StatusCode::OK, stored)
        }
        Err(err) => service_error(err),
    }
}
