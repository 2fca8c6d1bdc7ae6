use thiserror::Error;

/// Why a session or bot command was not applied. Rejections never reach the
/// client; the session layer logs them at debug level and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("session already controls a live player")]
    AlreadyInGame,

    #[error("no live player for this session")]
    NotInGame,

    #[error("player {0} not found")]
    PlayerNotFound(String),

    #[error("magazine is empty")]
    OutOfAmmo,

    #[error("reload in progress")]
    Reloading,

    #[error("weapon is cooling down")]
    FireCooldown,

    #[error("magazine already full")]
    MagazineFull,

    #[error("no reserve ammo")]
    NoReserve,

    #[error("power-up {0} no longer exists")]
    PowerUpMissing(String),

    #[error("power-up {0} is out of reach")]
    OutOfReach(String),
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server runtime failed: {0}")]
    Serve(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ServerResult<T> = Result<T, ServerError>;
