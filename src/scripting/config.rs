#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    SQLite,
    MySQL,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// $1, $2, $3... (Postgres)
    Numbered,
    /// ? (SQLite/MySQL)
    Question,
}

impl Dialect {
    /// Стиль плейсхолдеров диалекта.
    #[inline]
    pub fn placeholders(self) -> PlaceholderStyle {
        match self {
            Dialect::Postgres => PlaceholderStyle::Numbered,
            Dialect::SQLite | Dialect::MySQL => PlaceholderStyle::Question,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Dialect::Postgres => "postgres",
            Dialect::SQLite => "sqlite",
            Dialect::MySQL => "mysql",
        })
    }
}
