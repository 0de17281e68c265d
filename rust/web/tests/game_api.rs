use cardparty_engine::game::GameState;
use cardparty_web::errors::ErrorResponse;
use cardparty_web::server::{AppContext, WebServer};
use serde_json::{json, Value};
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;

fn routes() -> BoxedFilter<(Response,)> {
    WebServer::routes(&AppContext::new_for_tests())
}

async fn send(
    routes: &BoxedFilter<(Response,)>,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = warp::test::request().method(method).path(path);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.reply(routes).await;
    let status = response.status();
    let json = if response.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(response.body()).expect("json body")
    };
    (status, json)
}

/// Creates a game for "Ada" plus `bots` automated opponents and returns
/// `(gameId, playerId, state)`.
async fn create(routes: &BoxedFilter<(Response,)>, bots: usize) -> (String, String, GameState) {
    let (status, body) = send(
        routes,
        "POST",
        "/api/games",
        Some(json!({ "playerName": "Ada", "automatedOpponents": bots })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let game_id = body["gameId"].as_str().expect("gameId").to_string();
    let player_id = body["playerId"].as_str().expect("playerId").to_string();
    let state: GameState = serde_json::from_value(body["state"].clone()).expect("state");
    (game_id, player_id, state)
}

fn error_code(body: &Value) -> String {
    let error: ErrorResponse = serde_json::from_value(body.clone()).expect("error body");
    error.error
}

#[tokio::test]
async fn health_reports_game_count() {
    let routes = routes();
    create(&routes, 1).await;
    let (status, body) = send(&routes, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "games": 1 }));
}

#[tokio::test]
async fn created_game_is_readable_from_the_store() {
    let routes = routes();
    let (game_id, player_id, state) = create(&routes, 2).await;

    assert_eq!(state.version, 1);
    assert_eq!(state.players.len(), 3);
    assert_eq!(state.players[0].id, player_id);
    assert!(state.players.iter().all(|p| p.hand.len() == 7));
    assert_eq!(state.turn_message, "Ada's turn!");

    let (status, body) = send(&routes, "GET", &format!("/game/{game_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let stored: GameState = serde_json::from_value(body).expect("state");
    assert_eq!(stored, state);
}

#[tokio::test]
async fn missing_games_and_routes_are_404() {
    let routes = routes();
    let (status, body) = send(&routes, "GET", "/game/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "game_not_found");
    assert_eq!(body["details"]["gameId"], "nope");

    let (status, body) = send(&routes, "GET", "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");
}

#[tokio::test]
async fn create_rejects_bad_requests() {
    let routes = routes();
    let (status, body) = send(
        &routes,
        "POST",
        "/api/games",
        Some(json!({ "playerName": "Ada", "automatedOpponents": 3, "maxPlayers": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_player_count");

    let (status, body) = send(&routes, "POST", "/api/games", Some(json!({ "name": "Ada" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_request");

    let (status, body) = send(
        &routes,
        "POST",
        "/api/games",
        Some(json!({ "playerName": "Ada", "maxPlayers": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_request");
}

#[tokio::test]
async fn players_join_until_the_table_is_full() {
    let routes = routes();
    let (game_id, _, _) = create(&routes, 1).await;
    let path = format!("/api/games/{game_id}/players");

    let (status, body) = send(&routes, "POST", &path, Some(json!({ "playerName": "Lin" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let state: GameState = serde_json::from_value(body["state"].clone()).expect("state");
    assert_eq!(state.version, 2);
    assert_eq!(state.players.last().map(|p| p.id.as_str()), body["playerId"].as_str());
    assert!(state.validate().is_ok());

    let (status, _) = send(&routes, "POST", &path, Some(json!({ "playerName": "Kai" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&routes, "POST", &path, Some(json!({ "playerName": "Late" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "game_full");
}

#[tokio::test]
async fn moves_are_versioned() {
    let routes = routes();
    let (game_id, player_id, _) = create(&routes, 1).await;
    let path = format!("/api/games/{game_id}/moves");
    let draw = json!({ "type": "draw_card", "playerId": player_id });

    let (status, body) = send(
        &routes,
        "POST",
        &path,
        Some(json!({ "baseVersion": 1, "move": draw })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["state"]["version"], 2);
    assert_eq!(body["state"]["currentPlayerIndex"], 1);
    assert_eq!(body["events"][0]["kind"], "cards_drawn");
    assert_eq!(body["events"][0]["count"], 1);

    // a second client still holding version 1
    let (status, body) = send(
        &routes,
        "POST",
        &path,
        Some(json!({ "baseVersion": 1, "move": draw })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "version_conflict");
    assert_eq!(body["details"]["expected"], 2);
    assert_eq!(body["details"]["found"], 1);
}

#[tokio::test]
async fn illegal_moves_are_rejected_without_changes() {
    let routes = routes();
    let (game_id, player_id, state) = create(&routes, 1).await;
    let path = format!("/api/games/{game_id}/moves");

    let bot = state.players[1].id.clone();
    let (status, body) = send(
        &routes,
        "POST",
        &path,
        Some(json!({ "move": { "type": "draw_card", "playerId": bot } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "not_players_turn");

    let (status, body) = send(
        &routes,
        "POST",
        &path,
        Some(json!({ "move": { "type": "play_card", "playerId": player_id, "cardId": "card-999" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "illegal_move");

    let (status, body) = send(
        &routes,
        "POST",
        &path,
        Some(json!({ "move": { "type": "pass", "playerId": player_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "illegal_move");

    let (_, body) = send(&routes, "GET", &format!("/game/{game_id}"), None).await;
    let stored: GameState = serde_json::from_value(body).expect("state");
    assert_eq!(stored, state);
}

#[tokio::test]
async fn legal_moves_are_cards_in_hand() {
    let routes = routes();
    let (game_id, player_id, state) = create(&routes, 1).await;

    let (status, body) = send(
        &routes,
        "GET",
        &format!("/api/games/{game_id}/legal-moves/{player_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playerId"], player_id);
    let hand = &state.players[0];
    for id in body["cardIds"].as_array().expect("cardIds") {
        assert!(hand.holds(id.as_str().expect("id")));
    }

    let (status, body) = send(
        &routes,
        "GET",
        &format!("/api/games/{game_id}/legal-moves/stranger"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "player_not_found");
}

#[tokio::test]
async fn full_state_writes_use_compare_and_swap() {
    let routes = routes();
    let (game_id, _, state) = create(&routes, 1).await;
    let path = format!("/game/{game_id}");

    let mut edited = state.clone();
    edited.turn_message = "written by a client".into();
    let (status, body) = send(&routes, "PUT", &path, Some(json!(edited))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["version"], 2);
    assert_eq!(body["turnMessage"], "written by a client");

    // same base version again: someone else already wrote version 2
    let (status, body) = send(&routes, "POST", &path, Some(json!(edited))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "version_conflict");

    edited.version = 2;
    let (status, body) = send(&routes, "POST", &path, Some(json!(edited))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 3);
}

#[tokio::test]
async fn malformed_records_are_refused() {
    let routes = routes();
    let (game_id, _, state) = create(&routes, 1).await;
    let path = format!("/game/{game_id}");

    let response = warp::test::request()
        .method("PUT")
        .path(&path)
        .body("{\"gameId\": 12")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(response.body()).expect("json");
    assert_eq!(error_code(&body), "malformed_state");

    let mut duplicated = state.clone();
    let stolen = duplicated.deck[0].clone();
    duplicated.players[0].hand.push(stolen);
    let (status, body) = send(&routes, "PUT", &path, Some(json!(duplicated))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "malformed_state");

    let (status, body) = send(&routes, "PUT", "/game/other-id", Some(json!(state))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "malformed_state");
}

#[tokio::test]
async fn finished_games_are_read_only() {
    let routes = routes();
    let (game_id, player_id, state) = create(&routes, 1).await;
    let path = format!("/game/{game_id}");

    let mut finished = state.clone();
    let hand: Vec<_> = finished.players[0].hand.drain(..).collect();
    finished.deck.extend(hand);
    finished.is_game_over = true;
    finished.winner = Some(finished.players[0].clone());
    finished.turn_message = "Ada wins!".into();

    let (status, body) = send(&routes, "PUT", &path, Some(json!(finished))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["isGameOver"], true);

    finished.version = 2;
    let (status, body) = send(&routes, "PUT", &path, Some(json!(finished))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "game_finished");

    let (status, body) = send(
        &routes,
        "POST",
        &format!("/api/games/{game_id}/moves"),
        Some(json!({ "move": { "type": "draw_card", "playerId": player_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "game_over");
}

#[tokio::test]
async fn opponent_turn_moves_only_automated_players() {
    let routes = routes();
    let (game_id, player_id, _) = create(&routes, 1).await;
    let path = format!("/api/games/{game_id}/opponent-turn");

    let (status, body) = send(&routes, "POST", &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moved"], false);
    assert_eq!(body["state"]["version"], 1);

    let (status, _) = send(
        &routes,
        "POST",
        &format!("/api/games/{game_id}/moves"),
        Some(json!({ "move": { "type": "draw_card", "playerId": player_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&routes, "POST", &path, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["moved"], true);
    assert_eq!(body["state"]["version"], 3);
    assert!(!body["events"].as_array().expect("events").is_empty());
}

#[tokio::test]
async fn deleted_games_are_gone() {
    let routes = routes();
    let (game_id, _, _) = create(&routes, 1).await;
    let path = format!("/api/games/{game_id}");

    let response = warp::test::request()
        .method("DELETE")
        .path(&path)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());

    let (status, _) = send(&routes, "GET", &format!("/game/{game_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&routes, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "game_not_found");
}

#[tokio::test]
async fn event_stream_requires_an_existing_game() {
    let routes = routes();
    let (status, body) = send(&routes, "GET", "/api/games/missing/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "game_not_found");
}
