mod __tests__;
mod command;
mod error;
mod interface;
mod method;
mod proxy;
mod registry;
mod signature;

pub use command::SqlCommand;
pub use error::{Error, Result};
pub use interface::{
    ArgSpec, DefaultBody, InlineStatement, MapperInterface, MethodSpec, ParamSpec, ReturnSpec,
};
pub use method::{MapperArg, MapperArgs, MapperMethod, MapperOutput};
pub use proxy::{MapperProxy, MapperProxyFactory};
pub use registry::MapperRegistry;
pub use signature::{MethodSignature, ParamNameResolver};
