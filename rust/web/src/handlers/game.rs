use crate::games::{CreateGame, GameManager, GameServiceError, JoinGame, MoveOutcome};
use cardparty_engine::engine::{Move, TurnEvent};
use cardparty_engine::game::GameState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::{self, StatusCode};
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Version the client computed its move against.
    #[serde(default)]
    pub base_version: Option<u64>,
    #[serde(rename = "move")]
    pub mv: Move,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGameResponse {
    pub game_id: String,
    pub player_id: String,
    pub state: GameState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedGameResponse {
    pub player_id: String,
    pub state: GameState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentTurnResponse {
    /// False when no automated player was due to move.
    pub moved: bool,
    pub state: GameState,
    pub events: Vec<TurnEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesResponse {
    pub player_id: String,
    pub card_ids: Vec<String>,
}

/// Creates a game with the caller in the first seat.
///
/// - **Method**: POST
/// - **Path**: `/api/games`
///
/// ```json
/// { "playerName": "Ada", "automatedOpponents": 2, "maxPlayers": 4 }
/// ```
///
/// Responds 201 with `{gameId, playerId, state}`; 400 `invalid_player_count`
/// when the table would not fit.
pub async fn create_game(games: Arc<GameManager>, request: CreateGame) -> Response {
    match games.create_game(request) {
        Ok(state) => {
            let player_id = state
                .players
                .first()
                .map(|p| p.id.clone())
                .unwrap_or_default();
            games.schedule_automated_turns(&state.game_id);
            success_response(
                StatusCode::CREATED,
                CreatedGameResponse {
                    game_id: state.game_id.clone(),
                    player_id,
                    state,
                },
            )
        }
        Err(err) => service_error(err),
    }
}

/// Seats a new player after everyone already at the table.
///
/// - **Method**: POST
/// - **Path**: `/api/games/{gameId}/players`
///
/// Responds 201 with `{playerId, state}`; 409 `game_full` or `game_over`.
pub async fn join_game(games: Arc<GameManager>, game_id: String, request: JoinGame) -> Response {
    match games.join_game(&game_id, request) {
        Ok((player, state)) => {
            games.schedule_automated_turns(&game_id);
            success_response(
                StatusCode::CREATED,
                JoinedGameResponse {
                    player_id: player.id,
                    state,
                },
            )
        }
        Err(err) => service_error(err),
    }
}

/// Applies a move for the player whose turn it is.
///
/// - **Method**: POST
/// - **Path**: `/api/games/{gameId}/moves`
///
/// ```json
/// { "baseVersion": 3, "move": { "type": "play_card", "playerId": "p1", "cardId": "c-17" } }
/// ```
///
/// Responds 200 with `{state, events}`. Illegal moves are 400, a stale
/// `baseVersion` is 409 `version_conflict` with the current version in
/// `details.expected`. Automated players then move in the background.
pub async fn submit_move(games: Arc<GameManager>, game_id: String, request: MoveRequest) -> Response {
    match games.submit_move(&game_id, request.base_version, request.mv) {
        Ok(outcome) => {
            games.schedule_automated_turns(&game_id);
            success_response(StatusCode::OK, outcome)
        }
        Err(err) => service_error(err),
    }
}

/// Runs one automated turn immediately, for servers started without
/// autoplay.
///
/// - **Method**: POST
/// - **Path**: `/api/games/{gameId}/opponent-turn`
pub async fn opponent_turn(games: Arc<GameManager>, game_id: String) -> Response {
    let result = match games.run_automated_turn(&game_id).await {
        Ok(Some(MoveOutcome { state, events })) => Ok(OpponentTurnResponse {
            moved: true,
            state,
            events,
        }),
        Ok(None) => games.get_game(&game_id).map(|state| OpponentTurnResponse {
            moved: false,
            state,
            events: Vec::new(),
        }),
        Err(err) => Err(err),
    };
    match result {
        Ok(body) => success_response(StatusCode::OK, body),
        Err(err) => service_error(err),
    }
}

/// - **Method**: GET
/// - **Path**: `/api/games/{gameId}/legal-moves/{playerId}`
pub async fn legal_moves(games: Arc<GameManager>, game_id: String, player_id: String) -> Response {
    match games.legal_moves(&game_id, &player_id) {
        Ok(card_ids) => success_response(StatusCode::OK, LegalMovesResponse { player_id, card_ids }),
        Err(err) => service_error(err),
    }
}

/// Ends the game, notifies subscribers and forgets the record.
///
/// - **Method**: DELETE
/// - **Path**: `/api/games/{gameId}`
pub async fn delete_game(games: Arc<GameManager>, game_id: String) -> Response {
    match games.delete_game(&game_id) {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(err) => service_error(err),
    }
}

pub(crate) fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn empty_response(status: StatusCode) -> Response {
    let mut response = http::Response::new(warp::hyper::Body::empty());
    *response.status_mut() = status;
    response
}

pub(crate) fn service_error(err: GameServiceError) -> Response {
    use crate::errors::IntoErrorResponse;
    err.into_http_response()
}
