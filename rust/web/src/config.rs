//! Server settings, resolved in layers: built-in defaults, then a TOML file,
//! then `CARDPARTY_*` environment variables, then command-line flags. Every
//! field remembers which layer it came from.

use cardparty_ai::STRATEGIES;
use cardparty_engine::engine::MAX_TABLE_SIZE;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Names the TOML file to read when `--config` is not given.
pub const CONFIG_ENV: &str = "CARDPARTY_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Engine seed; `None` picks a random one at startup.
    pub seed: Option<u64>,
    /// Table size used when a create request does not name one.
    pub max_players: usize,
    pub ai_strategy: String,
    pub ai_think_ms: u64,
    pub ai_timeout_ms: u64,
    /// Whether automated seats move on their own after each commit.
    pub autoplay: bool,
    pub journal_path: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            seed: None,
            max_players: 4,
            ai_strategy: "baseline".into(),
            ai_think_ms: 800,
            ai_timeout_ms: 5_000,
            autoplay: true,
            journal_path: None,
        }
    }
}

impl ServerSettings {
    /// Ephemeral port, fixed seed, no think time and no autoplay.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            seed: Some(42),
            ai_think_ms: 0,
            autoplay: false,
            ..Self::default()
        }
    }

    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.ai_think_ms)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if !(2..=MAX_TABLE_SIZE).contains(&self.max_players) {
            return Err(ConfigError::Invalid(format!(
                "max_players must be between 2 and {MAX_TABLE_SIZE}"
            )));
        }
        let strategy = self.ai_strategy.trim();
        if strategy.is_empty() {
            return Err(ConfigError::Invalid("ai_strategy must not be empty".into()));
        }
        if !STRATEGIES.iter().any(|s| s.eq_ignore_ascii_case(strategy)) {
            return Err(ConfigError::Invalid(format!(
                "unknown ai_strategy `{strategy}` (expected one of {})",
                STRATEGIES.join(", ")
            )));
        }
        if self.ai_timeout_ms == 0 {
            return Err(ConfigError::Invalid("ai_timeout_ms must be >0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsSources {
    pub host: ValueSource,
    pub port: ValueSource,
    pub seed: ValueSource,
    pub max_players: ValueSource,
    pub ai_strategy: ValueSource,
    pub ai_think_ms: ValueSource,
    pub ai_timeout_ms: ValueSource,
    pub autoplay: ValueSource,
    pub journal_path: ValueSource,
}

impl Default for SettingsSources {
    fn default() -> Self {
        Self {
            host: ValueSource::Default,
            port: ValueSource::Default,
            seed: ValueSource::Default,
            max_players: ValueSource::Default,
            ai_strategy: ValueSource::Default,
            ai_think_ms: ValueSource::Default,
            ai_timeout_ms: ValueSource::Default,
            autoplay: ValueSource::Default,
            journal_path: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub settings: ServerSettings,
    pub sources: SettingsSources,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: `{value}`")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Command-line flags. Anything left unset falls through to the lower layers.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "cardparty-server", version, about = "Shared-state card game server")]
pub struct ServerArgs {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind to
    #[arg(long, short)]
    pub port: Option<u16>,
    /// Seed for dealing and reshuffling
    #[arg(long)]
    pub seed: Option<u64>,
    /// Default table size for new games
    #[arg(long)]
    pub max_players: Option<usize>,
    /// Automated opponent strategy (baseline, random)
    #[arg(long)]
    pub ai_strategy: Option<String>,
    /// Delay before an automated opponent moves, in milliseconds
    #[arg(long)]
    pub ai_think_ms: Option<u64>,
    /// Time allowed for an automated opponent to answer, in milliseconds
    #[arg(long)]
    pub ai_timeout_ms: Option<u64>,
    /// Let automated seats move on their own (true/false)
    #[arg(long)]
    pub autoplay: Option<bool>,
    /// Append accepted moves to this JSONL file
    #[arg(long)]
    pub journal: Option<PathBuf>,
    /// TOML settings file (overrides CARDPARTY_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    host: Option<String>,
    port: Option<u16>,
    seed: Option<u64>,
    max_players: Option<usize>,
    ai_strategy: Option<String>,
    ai_think_ms: Option<u64>,
    ai_timeout_ms: Option<u64>,
    autoplay: Option<bool>,
    journal_path: Option<PathBuf>,
}

pub fn load(args: &ServerArgs) -> Result<ServerSettings, ConfigError> {
    load_with_sources(args).map(|resolved| resolved.settings)
}

pub fn load_with_sources(args: &ServerArgs) -> Result<ResolvedSettings, ConfigError> {
    let mut cfg = ServerSettings::default();
    let mut sources = SettingsSources::default();

    let file = args
        .config
        .clone()
        .or_else(|| env_string(CONFIG_ENV).map(PathBuf::from));
    if let Some(path) = file {
        let f = read_file(&path)?;
        apply_file(&mut cfg, &mut sources, f);
    }
    apply_env(&mut cfg, &mut sources)?;
    apply_args(&mut cfg, &mut sources, args);

    cfg.validate()?;
    Ok(ResolvedSettings {
        settings: cfg,
        sources,
    })
}

fn read_file(path: &Path) -> Result<FileSettings, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&s)?)
}

fn layer<T>(slot: &mut T, source: &mut ValueSource, value: Option<T>, from: ValueSource) {
    if let Some(v) = value {
        *slot = v;
        *source = from;
    }
}

fn apply_file(cfg: &mut ServerSettings, sources: &mut SettingsSources, f: FileSettings) {
    let from = ValueSource::File;
    layer(&mut cfg.host, &mut sources.host, f.host, from);
    layer(&mut cfg.port, &mut sources.port, f.port, from);
    layer(&mut cfg.seed, &mut sources.seed, f.seed.map(Some), from);
    layer(&mut cfg.max_players, &mut sources.max_players, f.max_players, from);
    layer(&mut cfg.ai_strategy, &mut sources.ai_strategy, f.ai_strategy, from);
    layer(&mut cfg.ai_think_ms, &mut sources.ai_think_ms, f.ai_think_ms, from);
    layer(&mut cfg.ai_timeout_ms, &mut sources.ai_timeout_ms, f.ai_timeout_ms, from);
    layer(&mut cfg.autoplay, &mut sources.autoplay, f.autoplay, from);
    layer(
        &mut cfg.journal_path,
        &mut sources.journal_path,
        f.journal_path.map(Some),
        from,
    );
}

fn apply_env(cfg: &mut ServerSettings, sources: &mut SettingsSources) -> Result<(), ConfigError> {
    let from = ValueSource::Env;
    layer(&mut cfg.host, &mut sources.host, env_string("CARDPARTY_HOST"), from);
    layer(&mut cfg.port, &mut sources.port, env_parse("CARDPARTY_PORT")?, from);
    layer(
        &mut cfg.seed,
        &mut sources.seed,
        env_parse("CARDPARTY_SEED")?.map(Some),
        from,
    );
    layer(
        &mut cfg.max_players,
        &mut sources.max_players,
        env_parse("CARDPARTY_MAX_PLAYERS")?,
        from,
    );
    layer(
        &mut cfg.ai_strategy,
        &mut sources.ai_strategy,
        env_string("CARDPARTY_AI_STRATEGY"),
        from,
    );
    layer(
        &mut cfg.ai_think_ms,
        &mut sources.ai_think_ms,
        env_parse("CARDPARTY_AI_THINK_MS")?,
        from,
    );
    layer(
        &mut cfg.ai_timeout_ms,
        &mut sources.ai_timeout_ms,
        env_parse("CARDPARTY_AI_TIMEOUT_MS")?,
        from,
    );
    let autoplay = match env_string("CARDPARTY_AUTOPLAY") {
        Some(value) => Some(parse_bool(&value).ok_or(ConfigError::InvalidEnv {
            var: "CARDPARTY_AUTOPLAY",
            value,
        })?),
        None => None,
    };
    layer(&mut cfg.autoplay, &mut sources.autoplay, autoplay, from);
    layer(
        &mut cfg.journal_path,
        &mut sources.journal_path,
        env_string("CARDPARTY_JOURNAL").map(|p| Some(PathBuf::from(p))),
        from,
    );
    Ok(())
}

fn apply_args(cfg: &mut ServerSettings, sources: &mut SettingsSources, args: &ServerArgs) {
    let from = ValueSource::Cli;
    layer(&mut cfg.host, &mut sources.host, args.host.clone(), from);
    layer(&mut cfg.port, &mut sources.port, args.port, from);
    layer(&mut cfg.seed, &mut sources.seed, args.seed.map(Some), from);
    layer(&mut cfg.max_players, &mut sources.max_players, args.max_players, from);
    layer(
        &mut cfg.ai_strategy,
        &mut sources.ai_strategy,
        args.ai_strategy.clone(),
        from,
    );
    layer(&mut cfg.ai_think_ms, &mut sources.ai_think_ms, args.ai_think_ms, from);
    layer(
        &mut cfg.ai_timeout_ms,
        &mut sources.ai_timeout_ms,
        args.ai_timeout_ms,
        from,
    );
    layer(&mut cfg.autoplay, &mut sources.autoplay, args.autoplay, from);
    layer(
        &mut cfg.journal_path,
        &mut sources.journal_path,
        args.journal.clone().map(Some),
        from,
    );
}

/// Non-empty value of an environment variable.
fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env_string(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        None => Ok(None),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
