//! # Exported Scripts
//!
//! A [`Script`] is a pipeline with the graph taken away: a flat list of
//! steps, each naming the variables it reads and the variable it writes.
//! Running a script calls the same library functions the live nodes call,
//! so a script and the graph it was exported from produce equal values.
//!
//! ## Format
//!
//! Scripts serialize to JSON, one object per step, tagged by `op`:
//!
//! ```text
//! {"steps": [
//!   {"op": "connect", "out": "Db_out", "url": {"literal": "sqlite://"}},
//!   {"op": "query_database", "out": "Q_result", "conn": {"var": "Db_out"},
//!    "sql": {"literal": "SELECT 1"}, "has_result": {"literal": true},
//!    "params": [], "bulk": []}
//! ]}
//! ```
//!
//! An operand is either `{"var": name}`, the value a previous step wrote, or
//! `{"literal": json}`, a constant in the persisted pin value format. A
//! variable nothing has written reads as null, as an unwritten link does in
//! the graph.
//!
//! ## Bindings
//!
//! Query steps carry three binding lists: `tables` and `params` come from
//! the node's dynamic slots and may reference variables; `bulk` holds the
//! node's bulk parameters as literals. As on the node, a slot parameter wins
//! over a bulk entry with the same name.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::node::{
    frame_input, get_value, load_csv, open_connection, param_set, run_db_query, run_frame_query,
};
use crate::persist::{decode, PinValue};
use crate::query::{EngineConfig, ParamSet};

/// Variables written by a script run, by name.
pub type Vars = BTreeMap<String, PinValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Var(String),
    Literal(Json),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: Operand,
}

impl Binding {
    pub fn new(name: &str, value: Operand) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    /// Literal bindings for every entry of `params`, in order.
    pub fn literals(params: &ParamSet) -> Vec<Binding> {
        params
            .iter()
            .map(|(name, value)| Binding::new(name, Operand::Literal(value.to_json())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Connect {
        out: String,
        url: Operand,
    },
    ReadCsv {
        out: String,
        path: Operand,
    },
    QueryFrames {
        out: String,
        sql: Operand,
        tables: Vec<Binding>,
        params: Vec<Binding>,
        bulk: Vec<Binding>,
    },
    QueryDatabase {
        out: String,
        conn: Operand,
        sql: Operand,
        has_result: Operand,
        params: Vec<Binding>,
        bulk: Vec<Binding>,
    },
    ForEachRow {
        frame: Operand,
        idx: String,
        row: String,
        body: Vec<Step>,
    },
    GetValue {
        out: String,
        source: Operand,
        column: Operand,
        row: Operand,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::Connect { .. } => "connect",
            Step::ReadCsv { .. } => "read_csv",
            Step::QueryFrames { .. } => "query_frames",
            Step::QueryDatabase { .. } => "query_database",
            Step::ForEachRow { .. } => "for_each_row",
            Step::GetValue { .. } => "get_value",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).wrap_err("invalid script")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read script '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .wrap_err_with(|| format!("failed to write script '{}'", path.display()))
    }

    /// Runs every step in order and returns the variables they wrote.
    pub fn run(&self, config: &EngineConfig) -> Result<Vars> {
        self.run_with(config, Vars::new())
    }

    /// Runs with some variables already set, e.g. frames loaded by the
    /// caller.
    pub fn run_with(&self, config: &EngineConfig, vars: Vars) -> Result<Vars> {
        let mut runner = Runner { config, vars };
        runner.run_steps(&self.steps)?;
        info!(vars = runner.vars.len(), "script finished");
        Ok(runner.vars)
    }
}

struct Runner<'c> {
    config: &'c EngineConfig,
    vars: Vars,
}

impl Runner<'_> {
    fn eval(&self, operand: &Operand) -> PinValue {
        match operand {
            Operand::Var(name) => self.vars.get(name).cloned().unwrap_or_default(),
            Operand::Literal(json) => decode(json),
        }
    }

    fn eval_all(&self, bindings: &[Binding]) -> Vec<(String, PinValue)> {
        bindings
            .iter()
            .map(|b| (b.name.clone(), self.eval(&b.value)))
            .collect()
    }

    fn run_steps(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            debug!(index, op = step.op(), "step");
            self.run_step(step)
                .wrap_err_with(|| format!("step {} ({}) failed", index, step.op()))?;
        }
        Ok(())
    }

    fn run_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Connect { out, url } => {
                let handle = open_connection(self.eval(url))?;
                self.vars.insert(out.clone(), PinValue::Database(handle));
            }
            Step::ReadCsv { out, path } => {
                let frame = load_csv(self.eval(path))?;
                self.vars.insert(out.clone(), frame);
            }
            Step::QueryFrames {
                out,
                sql,
                tables,
                params,
                bulk,
            } => {
                let bulk = param_set(self.eval_all(bulk))?;
                let result = run_frame_query(
                    self.config,
                    self.eval(sql),
                    self.eval_all(tables),
                    self.eval_all(params),
                    &bulk,
                )?;
                self.vars.insert(out.clone(), result);
            }
            Step::QueryDatabase {
                out,
                conn,
                sql,
                has_result,
                params,
                bulk,
            } => {
                let bulk = param_set(self.eval_all(bulk))?;
                let result = run_db_query(
                    self.eval(conn),
                    self.eval(sql),
                    self.eval(has_result),
                    self.eval_all(params),
                    &bulk,
                )?;
                self.vars.insert(out.clone(), result);
            }
            Step::ForEachRow {
                frame,
                idx,
                row,
                body,
            } => {
                let frame = frame_input(self.eval(frame), "frame")?;
                frame.for_each_row(|label, series| {
                    self.vars.insert(idx.clone(), PinValue::scalar(label));
                    self.vars.insert(row.clone(), PinValue::Series(series));
                    self.run_steps(body)
                })?;
            }
            Step::GetValue {
                out,
                source,
                column,
                row,
            } => {
                let value = get_value(self.eval(source), self.eval(column), self.eval(row))?;
                self.vars.insert(out.clone(), value);
            }
        }
        Ok(())
    }
}
