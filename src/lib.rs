pub mod binding;
pub mod expr;
pub mod mapping;
pub mod param;
pub mod scripting;
pub mod session;
#[cfg(test)]
mod tests;
pub mod types;
pub mod value;

pub use binding::{
    MapperArgs, MapperInterface, MapperOutput, MapperProxy, MapperProxyFactory, MapperRegistry,
    MethodSpec, ReturnSpec,
};
pub use mapping::{BoundSql, MappedStatement, SqlCommandType};
pub use param::Param;
pub use scripting::{Dialect, SqlSource};
pub use session::{
    Configuration, Cursor, PooledSession, ResultHandler, RowBounds, SessionConfig, SqlSession,
};
pub use value::ParamObject;

#[cfg(not(any(feature = "postgres", feature = "mysql", feature = "sqlite")))]
compile_error!("Enable exactly one DB feature: `postgres`, `mysql`, or `sqlite`.");

#[cfg(all(feature = "postgres", any(feature = "mysql", feature = "sqlite")))]
compile_error!("Enable only one DB feature at a time (postgres vs mysql/sqlite).");

#[cfg(all(feature = "mysql", feature = "sqlite"))]
compile_error!("Enable only one DB feature at a time (mysql vs sqlite).");
