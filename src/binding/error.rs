pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid bound statement (not found): {id}")]
    MissingStatement { id: String },

    #[error("Unknown execution method for: {id}")]
    UnknownStatementKind { id: String },

    #[error("Method '{method}' cannot have multiple row-bounds parameters")]
    DuplicateRowBounds { method: String },

    #[error("Method '{method}' cannot have multiple result-handler parameters")]
    DuplicateResultHandler { method: String },

    #[error("Method '{method}' returns a map but declares no map key")]
    MissingMapKey { method: String },

    #[error("Method '{method}' has an unsupported return type for a row count")]
    UnsupportedReturnType { method: String },

    #[error("Method '{method}' attempted to return null for a primitive return type")]
    NullIntoPrimitive { method: String },

    #[error("Unknown method '{method}' on mapper interface '{interface}'")]
    UnknownMethod {
        interface: String,
        method: String,
    },

    #[error("Argument {index} of '{method}' does not match its declared kind")]
    ArgumentMismatch { method: String, index: usize },

    #[error("Method '{method}' expected {expected} domain argument(s), got {got}")]
    ArgumentCount {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("Mapper interface '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Mapper interface '{name}' is not registered")]
    NotRegistered { name: String },

    #[error(transparent)]
    Session(#[from] crate::session::Error),

    #[error(transparent)]
    Mapping(#[from] crate::mapping::Error),

    #[error(transparent)]
    Script(#[from] crate::scripting::Error),

    #[error(transparent)]
    Value(#[from] crate::value::Error),
}
