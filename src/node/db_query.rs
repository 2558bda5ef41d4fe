use eyre::Result;
use uuid::Uuid;

use super::{bool_input, database_input, param_set, text_input, SlotMap, COMPLETED, RESULT};
use crate::export::{Binding, Step};
use crate::graph::{Executor, Exporter, Input, Node};
use crate::handle::query_database;
use crate::persist::{PinValue, SlotKind};
use crate::query::ParamSet;
use crate::types::Value;

/// Runs SQL on a connected database.
pub struct DbQueryNode {
    name: String,
    conn: Input,
    sql: Input,
    has_result: Input,
    slots: SlotMap,
    bulk: ParamSet,
}

pub(crate) fn run_db_query(
    conn: PinValue,
    sql: PinValue,
    has_result: PinValue,
    params: Vec<(String, PinValue)>,
    bulk: &ParamSet,
) -> Result<PinValue> {
    let handle = database_input(conn, "conn")?;
    let sql = text_input(sql, "sql")?;
    let has_result = bool_input(has_result, "has_result")?;
    let params = ParamSet::merged(&param_set(params)?, bulk);
    Ok(query_database(&handle, &sql, has_result, &params)?.into())
}

impl DbQueryNode {
    pub fn new(name: impl Into<String>, conn: Input, sql: Input) -> Self {
        Self {
            name: name.into(),
            conn,
            sql,
            has_result: Input::value(Value::Bool(true)),
            slots: SlotMap::new(),
            bulk: ParamSet::new(),
        }
    }

    pub fn with_has_result(mut self, has_result: Input) -> Self {
        self.has_result = has_result;
        self
    }

    pub fn add_param(&mut self, name: impl Into<String>, input: Input) -> Result<Uuid> {
        self.slots.add(name, SlotKind::Param, input)
    }

    pub fn slots(&self) -> &SlotMap {
        &self.slots
    }

    pub fn set_bulk_params(&mut self, bulk: ParamSet) {
        self.bulk = bulk;
    }
}

impl Node for DbQueryNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()> {
        let result = run_db_query(
            exec.input(&self.conn),
            exec.input(&self.sql),
            exec.input(&self.has_result),
            self.slots.values(SlotKind::Param, exec),
            &self.bulk,
        )?;
        exec.set_output(RESULT, result);
        exec.fire(COMPLETED)
    }

    fn export(&self, exporter: &mut Exporter<'_>) -> Result<()> {
        let params = self
            .slots
            .iter()
            .map(|s| Binding::new(&s.name, exporter.operand(&s.input)))
            .collect();
        exporter.push(Step::QueryDatabase {
            out: exporter.output(RESULT),
            conn: exporter.operand(&self.conn),
            sql: exporter.operand(&self.sql),
            has_result: exporter.operand(&self.has_result),
            params,
            bulk: Binding::literals(&self.bulk),
        });
        exporter.follow(COMPLETED)
    }
}
