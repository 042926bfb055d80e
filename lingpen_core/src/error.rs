use thiserror::Error;

/// Errors raised while bringing the core up (config + database bootstrap).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no platform data directory available")]
    NoDataDir,

    #[error("config io error")]
    Io(#[from] std::io::Error),

    #[error("config serialization error")]
    Serde(#[from] serde_json::Error),

    #[error("database error")]
    Db(#[from] sea_orm::DbErr),
}
