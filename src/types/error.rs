pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown jdbcType '{name}'")]
    UnknownJdbcType { name: String },

    #[error("Unknown typeHandler '{name}'")]
    UnknownTypeHandler { name: String },

    #[error("Cannot bind {kind} value for parameter '{property}'")]
    Unbindable {
        property: String,
        kind: &'static str,
    },
}
