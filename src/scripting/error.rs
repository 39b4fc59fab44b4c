use std::borrow::Cow;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown element <{name}> in SQL statement")]
    UnknownElement { name: String },

    #[error("Too many <otherwise> elements in <choose> statement")]
    TooManyOtherwise,

    #[error("Unexpected <{name}> inside <choose>: only <when> and <otherwise> are allowed")]
    MisplacedChooseChild { name: String },

    #[error("Element <{element}> requires attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<foreach> has no 'collection' attribute")]
    MissingCollection,

    #[error("<foreach> collection expression '{expr}' evaluated to null")]
    NullCollection { expr: String },

    #[error("<foreach> collection expression '{expr}' is not iterable (got {kind})")]
    NotIterable { expr: String, kind: &'static str },

    #[error("Malformed parameter token #{{{content}}}: {reason}")]
    MalformedParameter {
        content: String,
        reason: Cow<'static, str>,
    },

    #[error("Inline script is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error(transparent)]
    Expr(#[from] crate::expr::Error),

    #[error(transparent)]
    Value(#[from] crate::value::Error),

    #[error(transparent)]
    Types(#[from] crate::types::Error),
}
