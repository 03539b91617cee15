#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("time parse error: {0}")]
    TimeParse(#[from] chrono::ParseError),
    #[error("stored interval error: {0}")]
    InvalidInterval(#[from] tabstats_core::UnknownInterval),
    #[error("stored render count {0} is out of range")]
    CountOutOfRange(i64),
}

pub type Result<T> = std::result::Result<T, DbError>;
