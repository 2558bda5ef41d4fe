use eyre::Result;
use tracing::debug;
use uuid::Uuid;

use super::{param_set, table_set, text_input, SlotMap, COMPLETED, RESULT};
use crate::export::{Binding, Step};
use crate::graph::{Executor, Exporter, Input, Node};
use crate::persist::{PinValue, SlotKind};
use crate::query::{query_frames, EngineConfig, ParamSet};

/// Runs SQL over frames bound to its table slots.
///
/// Table slots become tables named after the slot; param slots and the bulk
/// parameters become named parameters. A slot and a bulk entry with the same
/// name resolve to the slot. Every compute uses a fresh engine, so tables are
/// materialized again on each run.
pub struct FrameQueryNode {
    name: String,
    sql: Input,
    slots: SlotMap,
    bulk: ParamSet,
    config: EngineConfig,
}

/// Binds evaluated slots and runs `sql`; shared by the node and the script
/// runner.
pub(crate) fn run_frame_query(
    config: &EngineConfig,
    sql: PinValue,
    tables: Vec<(String, PinValue)>,
    params: Vec<(String, PinValue)>,
    bulk: &ParamSet,
) -> Result<PinValue> {
    let sql = text_input(sql, "sql")?;
    let tables = table_set(tables);
    let params = ParamSet::merged(&param_set(params)?, bulk);
    debug!(tables = tables.len(), params = params.len(), "frame query");
    Ok(query_frames(config, &sql, &tables, &params)?.into())
}

impl FrameQueryNode {
    pub fn new(name: impl Into<String>, sql: Input) -> Self {
        Self {
            name: name.into(),
            sql,
            slots: SlotMap::new(),
            bulk: ParamSet::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_table(&mut self, name: impl Into<String>, input: Input) -> Result<Uuid> {
        self.slots.add(name, SlotKind::Table, input)
    }

    pub fn add_param(&mut self, name: impl Into<String>, input: Input) -> Result<Uuid> {
        self.slots.add(name, SlotKind::Param, input)
    }

    pub fn slots(&self) -> &SlotMap {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotMap {
        &mut self.slots
    }

    /// Parameters given as one map rather than one slot each.
    pub fn bulk_params(&self) -> &ParamSet {
        &self.bulk
    }

    pub fn set_bulk_params(&mut self, bulk: ParamSet) {
        self.bulk = bulk;
    }
}

impl Node for FrameQueryNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()> {
        let result = run_frame_query(
            &self.config,
            exec.input(&self.sql),
            self.slots.values(SlotKind::Table, exec),
            self.slots.values(SlotKind::Param, exec),
            &self.bulk,
        )?;
        exec.set_output(RESULT, result);
        exec.fire(COMPLETED)
    }

    fn export(&self, exporter: &mut Exporter<'_>) -> Result<()> {
        let bindings = |kind| {
            self.slots
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| Binding::new(&s.name, exporter.operand(&s.input)))
                .collect::<Vec<_>>()
        };
        let step = Step::QueryFrames {
            out: exporter.output(RESULT),
            sql: exporter.operand(&self.sql),
            tables: bindings(SlotKind::Table),
            params: bindings(SlotKind::Param),
            bulk: Binding::literals(&self.bulk),
        };
        exporter.push(step);
        exporter.follow(COMPLETED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DataFrame;
    use crate::graph::{slot_name, Graph};
    use crate::types::Value;

    fn people() -> DataFrame {
        DataFrame::from_rows(
            vec!["id", "name"],
            vec![
                vec![Value::Int(1), Value::Text("aaa".into())],
                vec![Value::Int(2), Value::Text("bbb".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn slot_param_wins_over_bulk() {
        let mut node = FrameQueryNode::new("Q", Input::value(Value::from("SELECT :x AS x")));
        node.add_param("x", Input::value(Value::Int(1))).unwrap();
        node.set_bulk_params([("x", 2)].into_iter().collect());

        let mut graph = Graph::new();
        graph.add(node).unwrap();
        graph.run_from("Q").unwrap();

        let PinValue::Frame(frame) = graph.value(&slot_name("Q", RESULT)).unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.cell(0, "x"), Some(&Value::Int(1)));
    }

    #[test]
    fn table_slot_is_queryable_by_name() {
        let mut node = FrameQueryNode::new(
            "Q",
            Input::value(Value::from("SELECT name FROM people WHERE id = :id")),
        );
        node.add_table("people", Input::value(people())).unwrap();
        node.set_bulk_params([("id", 2)].into_iter().collect());

        let mut graph = Graph::new();
        graph.add(node).unwrap();
        graph.run_from("Q").unwrap();

        let PinValue::Frame(frame) = graph.value(&slot_name("Q", RESULT)).unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.cell(0, "name"), Some(&Value::Text("bbb".into())));
    }

    #[test]
    fn statement_without_rows_gives_null() {
        let node = FrameQueryNode::new("Q", Input::value(Value::from("CREATE TABLE t (a)")));

        let mut graph = Graph::new();
        graph.add(node).unwrap();
        graph.run_from("Q").unwrap();

        assert_eq!(graph.value(&slot_name("Q", RESULT)), Some(&PinValue::Null));
    }

    #[test]
    fn export_keeps_links_as_vars_and_bulk_as_literals() {
        let mut node = FrameQueryNode::new("Q", Input::value(Value::from("SELECT 1")));
        node.add_table("t", Input::link("Load", "out")).unwrap();
        node.set_bulk_params([("y", "b")].into_iter().collect());

        let mut graph = Graph::new();
        graph.add(node).unwrap();
        let script = graph.export("Q").unwrap();

        let Step::QueryFrames { tables, bulk, .. } = &script.steps[0] else {
            panic!("expected a query step");
        };
        assert_eq!(tables[0], Binding::new("t", crate::export::Operand::Var("Load_out".into())));
        assert_eq!(
            bulk[0],
            Binding::new("y", crate::export::Operand::Literal(serde_json::json!("b")))
        );
    }
}
