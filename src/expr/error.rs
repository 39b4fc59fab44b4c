use std::borrow::Cow;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Parse error in expression '{expr}' at byte {pos}: {reason}")]
    Parse {
        expr: String,
        pos: usize,
        reason: Cow<'static, str>,
    },

    #[error("Expression '{expr}' is not a plain property path")]
    NotAPath { expr: String },

    #[error("Operator '{op}' is not applicable to {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error(transparent)]
    Value(#[from] crate::value::Error),
}
