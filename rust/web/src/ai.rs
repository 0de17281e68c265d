//! Bridges the synchronous [`AIOpponent`] strategies into the async server.
//!
//! A strategy runs on the blocking pool under a deadline. Whatever goes wrong
//! (a timeout, a panic inside the strategy) the adapter answers with a draw,
//! which the engine can always validate.

use cardparty_ai::{create_ai, AIOpponent};
use cardparty_engine::opponent::{OpponentRequest, OpponentResponse};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, ServerSettings};

#[derive(Clone)]
pub struct OpponentAdapter {
    opponent: Arc<dyn AIOpponent>,
    think_time: Duration,
    timeout: Duration,
}

impl std::fmt::Debug for OpponentAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpponentAdapter")
            .field("opponent", &self.opponent.name())
            .field("think_time", &self.think_time)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpponentAdapter {
    pub fn new(opponent: Box<dyn AIOpponent>, think_time: Duration, timeout: Duration) -> Self {
        Self {
            opponent: Arc::from(opponent),
            think_time,
            timeout,
        }
    }

    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ConfigError> {
        let opponent = create_ai(&settings.ai_strategy).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown ai_strategy `{}`", settings.ai_strategy))
        })?;
        Ok(Self::new(
            opponent,
            settings.think_time(),
            settings.ai_timeout(),
        ))
    }

    pub fn name(&self) -> &str {
        self.opponent.name()
    }

    /// Simulated deliberation before a proposal is requested.
    pub fn think_time(&self) -> Duration {
        self.think_time
    }

    pub async fn propose(&self, request: OpponentRequest) -> OpponentResponse {
        let opponent = Arc::clone(&self.opponent);
        let player = request.current_player.clone();
        let task = tokio::task::spawn_blocking(move || opponent.propose(&request));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(response)) => {
                tracing::debug!(
                    player = %player,
                    opponent = self.name(),
                    action = ?response.action,
                    card = ?response.card_to_play,
                    "opponent proposed a move"
                );
                response
            }
            Ok(Err(err)) => {
                tracing::warn!(player = %player, error = %err, "opponent failed, drawing instead");
                OpponentResponse::draw()
            }
            Err(_) => {
                tracing::warn!(
                    player = %player,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "opponent timed out, drawing instead"
                );
                OpponentResponse::draw()
            }
        }
    }
}
