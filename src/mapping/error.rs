pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Mapper XML is not well-formed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Expected <mapper> document root, found <{found}>")]
    NotAMapperDocument { found: String },

    #[error("<mapper> requires a 'namespace' attribute")]
    MissingNamespace,

    #[error("Statement <{element}> requires an 'id' attribute")]
    MissingStatementId { element: String },

    #[error("Duplicate statement id '{id}'")]
    DuplicateStatement { id: String },

    #[error(transparent)]
    Script(#[from] crate::scripting::Error),
}
