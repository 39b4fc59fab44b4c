mod __tests__;
mod builder;
mod config;
mod context;
mod error;
mod node;
mod source;
mod tokens;
mod writer;

pub use builder::{build_source_from_node, build_source_from_str};
pub use config::{Dialect, PlaceholderStyle};
pub use context::{DynamicContext, PARAMETER_BINDING};
pub use error::{Error, Result};
pub use node::{BindNode, ChooseNode, ForEachNode, IfNode, SqlNode, TrimNode};
pub use source::{DynamicSqlSource, RawSqlSource, SqlSource};
