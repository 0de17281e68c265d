//! HTTP server for Card Party: the replicated game record store, the game
//! service that drives the rules engine and automated opponents, and the
//! event stream clients listen on.

pub mod ai;
pub mod config;
pub mod errors;
pub mod events;
pub mod games;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod store;

pub use ai::OpponentAdapter;
pub use config::{ConfigError, ServerArgs, ServerSettings, ValueSource};
pub use errors::{handle_rejection, ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use events::{EventBus, GameEvent, PlayerInfo};
pub use games::{CreateGame, GameManager, GameServiceError, JoinGame, MoveOutcome};
pub use logging::{init_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use middleware::{log_response, with_request_logging};
pub use server::{AppContext, ServerError, ServerHandle, WebServer};
pub use store::{GameId, GameStore, StoreError};
