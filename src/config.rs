use std::path::PathBuf;

use clap::Parser;

use crate::constants::{CORRECTION_TICK_MS, DEFAULT_BOT_COUNT, MAX_BOT_COUNT, TICK_MS};
use crate::error::{ServerError, ServerResult};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Authoritative arena shooter server")]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory holding the browser client; served as a fallback route.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    #[arg(long = "bots", env = "BOT_COUNT", default_value_t = DEFAULT_BOT_COUNT)]
    pub bot_count: usize,

    #[arg(long, env = "TICK_MS", default_value_t = TICK_MS)]
    pub tick_ms: u64,

    #[arg(long, env = "CORRECTION_MS", default_value_t = CORRECTION_TICK_MS)]
    pub correction_ms: u64,

    #[arg(long, env = "SEED")]
    pub seed: Option<u32>,
}

impl ServerConfig {
    pub fn validate(mut self) -> ServerResult<Self> {
        if self.tick_ms == 0 {
            return Err(ServerError::Config("tick-ms must be positive".to_string()));
        }
        if self.correction_ms == 0 {
            return Err(ServerError::Config(
                "correction-ms must be positive".to_string(),
            ));
        }
        self.bot_count = normalize_bot_count(self.bot_count);
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        if let Some(path) = &self.static_dir {
            if path.join("index.html").is_file() {
                return Some(path.clone());
            }
        }
        [PathBuf::from("public"), PathBuf::from("../public")]
            .into_iter()
            .find(|path| path.join("index.html").is_file())
    }
}

pub fn normalize_bot_count(value: usize) -> usize {
    value.min(MAX_BOT_COUNT)
}
