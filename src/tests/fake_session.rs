use std::sync::Mutex;

use serde_json::Value;

use crate::session::{Configuration, Result, RowBounds, SqlSession};
use crate::value::ParamObject;

/// Что и с чем вызвали у сессии — для ассертов диспетчеризации.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Insert { statement: String, param: ParamObject },
    Update { statement: String, param: ParamObject },
    Delete { statement: String, param: ParamObject },
    SelectList {
        statement: String,
        param: ParamObject,
        bounds: RowBounds,
    },
    Flush,
}

/// Записывающая сессия: отдаёт заготовленные строки/счётчики и копит вызовы.
pub struct FakeSession {
    pub configuration: Configuration,
    pub calls: Mutex<Vec<Call>>,
    pub rows: Vec<Value>,
    pub affected: u64,
}

impl FakeSession {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            calls: Mutex::new(Vec::new()),
            rows: Vec::new(),
            affected: 1,
        }
    }

    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SqlSession for FakeSession {
    fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn insert(&self, statement: &str, param: &ParamObject) -> Result<u64> {
        self.record(Call::Insert {
            statement: statement.to_string(),
            param: param.clone(),
        });
        Ok(self.affected)
    }

    fn update(&self, statement: &str, param: &ParamObject) -> Result<u64> {
        self.record(Call::Update {
            statement: statement.to_string(),
            param: param.clone(),
        });
        Ok(self.affected)
    }

    fn delete(&self, statement: &str, param: &ParamObject) -> Result<u64> {
        self.record(Call::Delete {
            statement: statement.to_string(),
            param: param.clone(),
        });
        Ok(self.affected)
    }

    fn select_list(
        &self,
        statement: &str,
        param: &ParamObject,
        bounds: RowBounds,
    ) -> Result<Vec<Value>> {
        self.record(Call::SelectList {
            statement: statement.to_string(),
            param: param.clone(),
            bounds,
        });
        Ok(bounds.apply(self.rows.clone()))
    }

    fn flush_statements(&self) -> Result<u64> {
        self.record(Call::Flush);
        Ok(self.affected)
    }
}
