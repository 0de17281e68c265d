use crate::ai::OpponentAdapter;
use crate::config::{ConfigError, ServerSettings};
use crate::errors::handle_rejection;
use crate::events::EventBus;
use crate::games::{CreateGame, GameManager, JoinGame};
use crate::handlers;
use crate::middleware::with_request_logging;
use crate::store::GameStore;
use cardparty_engine::engine::Engine;
use cardparty_engine::logger::MoveJournal;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;
use warp::filters::BoxedFilter;
use warp::hyper::body::Bytes;
use warp::reply::{Reply, Response};
use warp::Filter;

const JSON_BODY_LIMIT: u64 = 64 * 1024;
const STATE_BODY_LIMIT: u64 = 1024 * 1024;

/// Everything the routes share.
#[derive(Debug, Clone)]
pub struct AppContext {
    settings: ServerSettings,
    event_bus: Arc<EventBus>,
    store: Arc<GameStore>,
    games: Arc<GameManager>,
}

impl AppContext {
    pub fn new(settings: ServerSettings) -> Result<Self, ServerError> {
        settings.validate()?;
        let event_bus = Arc::new(EventBus::new());
        let store = Arc::new(GameStore::new());
        let adapter = OpponentAdapter::from_settings(&settings)?;

        let mut games = GameManager::new(
            Arc::clone(&store),
            Arc::clone(&event_bus),
            Engine::new(settings.seed),
            adapter,
        )
        .with_autoplay(settings.autoplay)
        .with_default_max_players(settings.max_players);

        if let Some(path) = &settings.journal_path {
            let journal = MoveJournal::open(path).map_err(|source| ServerError::Journal {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "journalling moves");
            games = games.with_journal(journal);
        }

        Ok(Self {
            settings,
            event_bus,
            store,
            games: Arc::new(games),
        })
    }

    pub fn new_for_tests() -> Self {
        match Self::new(ServerSettings::for_tests()) {
            Ok(context) => context,
            Err(err) => panic!("test context: {err}"),
        }
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn store(&self) -> Arc<GameStore> {
        Arc::clone(&self.store)
    }

    pub fn games(&self) -> Arc<GameManager> {
        Arc::clone(&self.games)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Failed to open move journal {path}: {source}")]
    Journal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Server setup failed: {0}")]
    Setup(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(settings: ServerSettings) -> Result<Self, ServerError> {
        let context = AppContext::new(settings)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.settings())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        info!(
            address = %addr,
            ai_strategy = %context.settings().ai_strategy,
            autoplay = context.settings().autoplay,
            "card party server listening"
        );

        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, context))
    }

    fn bind_addr(settings: &ServerSettings) -> Result<SocketAddr, ServerError> {
        let host = settings.host.as_str();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, settings.port));
        }

        let candidate = format!("{}:{}", host, settings.port);
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::Setup(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::Setup(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
            source = cause.source();
        }

        ServerError::Setup(err.to_string())
    }

    /// The complete filter tree, with rejections rendered as JSON errors and
    /// every request logged.
    pub fn routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let api = Self::health_route(context)
            .or(Self::state_routes(context))
            .unify()
            .or(Self::game_routes(context))
            .unify()
            .or(Self::sse_routes(context))
            .unify();

        with_request_logging(api.recover(handle_rejection).unify()).boxed()
    }

    fn health_route(context: &AppContext) -> BoxedFilter<(Response,)> {
        let store = context.store();
        warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(move || handlers::health(store.ids().len()).into_response())
            .boxed()
    }

    fn state_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let games = context.games();

        let get = warp::path!("game" / String)
            .and(warp::get())
            .and(Self::with_games(games.clone()))
            .then(|game_id: String, games: Arc<GameManager>| handlers::get_state(games, game_id));

        let put = warp::path!("game" / String)
            .and(warp::put().or(warp::post()).unify())
            .and(Self::with_games(games))
            .and(warp::body::content_length_limit(STATE_BODY_LIMIT))
            .and(warp::body::bytes())
            .then(|game_id: String, games: Arc<GameManager>, body: Bytes| {
                handlers::put_state(games, game_id, body)
            });

        get.or(put).unify().boxed()
    }

    fn game_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let games = context.games();

        let create = warp::path!("api" / "games")
            .and(warp::post())
            .and(Self::with_games(games.clone()))
            .and(Self::json_body::<CreateGame>())
            .then(|games: Arc<GameManager>, request: CreateGame| {
                handlers::create_game(games, request)
            });

        let join = warp::path!("api" / "games" / String / "players")
            .and(warp::post())
            .and(Self::with_games(games.clone()))
            .and(Self::json_body::<JoinGame>())
            .then(|game_id: String, games: Arc<GameManager>, request: JoinGame| {
                handlers::join_game(games, game_id, request)
            });

        let moves = warp::path!("api" / "games" / String / "moves")
            .and(warp::post())
            .and(Self::with_games(games.clone()))
            .and(Self::json_body::<handlers::MoveRequest>())
            .then(
                |game_id: String, games: Arc<GameManager>, request: handlers::MoveRequest| {
                    handlers::submit_move(games, game_id, request)
                },
            );

        let opponent = warp::path!("api" / "games" / String / "opponent-turn")
            .and(warp::post())
            .and(Self::with_games(games.clone()))
            .then(|game_id: String, games: Arc<GameManager>| {
                handlers::opponent_turn(games, game_id)
            });

        let legal = warp::path!("api" / "games" / String / "legal-moves" / String)
            .and(warp::get())
            .and(Self::with_games(games.clone()))
            .then(
                |game_id: String, player_id: String, games: Arc<GameManager>| {
                    handlers::legal_moves(games, game_id, player_id)
                },
            );

        let delete = warp::path!("api" / "games" / String)
            .and(warp::delete())
            .and(Self::with_games(games))
            .then(|game_id: String, games: Arc<GameManager>| {
                handlers::delete_game(games, game_id)
            });

        create
            .or(join)
            .unify()
            .or(moves)
            .unify()
            .or(opponent)
            .unify()
            .or(legal)
            .unify()
            .or(delete)
            .unify()
            .boxed()
    }

    fn sse_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let games = context.games();
        let event_bus = context.event_bus();

        warp::path!("api" / "games" / String / "events")
            .and(warp::get())
            .and(Self::with_games(games))
            .and(Self::with_event_bus(event_bus))
            .then(
                |game_id: String, games: Arc<GameManager>, event_bus: Arc<EventBus>| {
                    handlers::stream_events(game_id, games, event_bus)
                },
            )
            .boxed()
    }

    fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
    where
        T: serde::de::DeserializeOwned + Send,
    {
        warp::body::content_length_limit(JSON_BODY_LIMIT).and(warp::body::json())
    }

    fn with_games(
        games: Arc<GameManager>,
    ) -> impl Filter<Extract = (Arc<GameManager>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&games))
    }

    fn with_event_bus(
        event_bus: Arc<EventBus>,
    ) -> impl Filter<Extract = (Arc<EventBus>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&event_bus))
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::Setup(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        info!(address = %self.addr, "card party server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
