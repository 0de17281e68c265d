pub mod game;
pub mod health;
pub mod sse;
pub mod state;

pub use game::{
    create_game, delete_game, join_game, legal_moves, opponent_turn, submit_move,
    CreatedGameResponse, JoinedGameResponse, LegalMovesResponse, MoveRequest,
    OpponentTurnResponse,
};
pub use health::health;
pub use sse::stream_events;
pub use state::{get_state, put_state};
