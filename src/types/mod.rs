mod __tests__;
mod error;
mod handler;

pub use error::{Error, Result};
pub use handler::{DefaultTypeHandler, TypeHandler, TypeHandlerRegistry};

use std::str::FromStr;

/// Тип драйверного слота из атрибута `jdbcType=...` параметрного токена.
/// Закрытый список; незнакомое имя — ошибка сборки стейтмента.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JdbcType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Clob,
    Boolean,
    Null,
    Other,
}

impl JdbcType {
    /// Числовой ли слот (для выбора типизированного NULL).
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            JdbcType::Bit | JdbcType::TinyInt | JdbcType::SmallInt | JdbcType::Integer | JdbcType::BigInt
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(
            self,
            JdbcType::Float | JdbcType::Real | JdbcType::Double | JdbcType::Numeric | JdbcType::Decimal
        )
    }

    pub fn is_binary(self) -> bool {
        matches!(
            self,
            JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Blob
        )
    }
}

impl FromStr for JdbcType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "BIT" => JdbcType::Bit,
            "TINYINT" => JdbcType::TinyInt,
            "SMALLINT" => JdbcType::SmallInt,
            "INTEGER" => JdbcType::Integer,
            "BIGINT" => JdbcType::BigInt,
            "FLOAT" => JdbcType::Float,
            "REAL" => JdbcType::Real,
            "DOUBLE" => JdbcType::Double,
            "NUMERIC" => JdbcType::Numeric,
            "DECIMAL" => JdbcType::Decimal,
            "CHAR" => JdbcType::Char,
            "VARCHAR" => JdbcType::Varchar,
            "LONGVARCHAR" => JdbcType::LongVarchar,
            "DATE" => JdbcType::Date,
            "TIME" => JdbcType::Time,
            "TIMESTAMP" => JdbcType::Timestamp,
            "BINARY" => JdbcType::Binary,
            "VARBINARY" => JdbcType::VarBinary,
            "LONGVARBINARY" => JdbcType::LongVarBinary,
            "BLOB" => JdbcType::Blob,
            "CLOB" => JdbcType::Clob,
            "BOOLEAN" => JdbcType::Boolean,
            "NULL" => JdbcType::Null,
            "OTHER" => JdbcType::Other,
            other => {
                return Err(Error::UnknownJdbcType {
                    name: other.to_string(),
                });
            }
        })
    }
}
