use std::path::PathBuf;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default welcome banner.
pub const DEFAULT_WELCOME: &str = "Welcome to Entity. Ask me anything, or run a \
terminal command on the server with `run: <command>` (e.g. `run: ls -l`).";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the chat backend
    #[arg(long, env = "ENTITY_SERVER_URL")]
    pub server_url: Option<String>,

    /// Per-request timeout in seconds (no timeout when unset)
    #[arg(long, env = "ENTITY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Write the transcript as HTML to this file on exit
    #[arg(long)]
    pub export_html: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: String,
    pub chat_path: String,
    pub execute_path: String,
    pub processes_path: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/api/chat".to_string(),
            execute_path: "/api/execute".to_string(),
            processes_path: "/api/processes".to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub welcome_message: String,
    /// Serve `run: list_processes` from the processes endpoint.
    pub list_processes_builtin: bool,
    #[serde(default)]
    pub export_html: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let defaults = ServerConfig::default();
        let mut builder = Config::builder()
            .set_default("server.base_url", defaults.base_url)?
            .set_default("server.chat_path", defaults.chat_path)?
            .set_default("server.execute_path", defaults.execute_path)?
            .set_default("server.processes_path", defaults.processes_path)?
            .set_default("ui.welcome_message", DEFAULT_WELCOME)?
            .set_default("ui.list_processes_builtin", false)?
            .set_default("log.json", false)?;

        // Config files: explicit path wins, otherwise home then cwd.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else {
            for path in default_config_paths() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        // Environment, e.g. ENTITY_SERVER__BASE_URL=http://host:8000
        builder = builder.add_source(
            Environment::with_prefix("ENTITY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their env fallbacks) have the final say.
        if let Some(url) = cli.server_url {
            builder = builder.set_override("server.base_url", url)?;
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.set_override("server.request_timeout_secs", secs)?;
        }
        if let Some(path) = cli.export_html {
            builder = builder.set_override("ui.export_html", path)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("log.json", json)?;
        }

        builder.build()?.try_deserialize()
    }
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".entity").join("config.yaml"));
    }
    paths.push(PathBuf::from("config.yaml"));
    paths
}
