use std::borrow::Cow;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No database_url or pool was provided")]
    MissingConnection,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Invalid DSN URL: {0}")]
    InvalidUrl(url::ParseError),

    #[error("Invalid integer for {key}: {value}")]
    InvalidInt {
        key: Cow<'static, str>,
        value: String,
    },

    #[error("Invalid bool for {key}: {value} (use true/false/1/0)")]
    InvalidBool {
        key: Cow<'static, str>,
        value: String,
    },

    #[error("Invalid duration for {key}: {value} (e.g. 250ms, 5s, 2m, 1h)")]
    InvalidDuration {
        key: Cow<'static, str>,
        value: String,
    },

    #[error("Invalid database scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Unknown statement '{id}'")]
    UnknownStatement { id: String },

    #[error("Statement '{statement}' expected one result, got {count}")]
    TooManyResults { statement: String, count: usize },

    #[error(transparent)]
    Script(#[from] crate::scripting::Error),

    #[error(transparent)]
    Type(#[from] crate::types::Error),

    #[error(transparent)]
    Value(#[from] crate::value::Error),
}
