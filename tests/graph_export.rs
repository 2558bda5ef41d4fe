//! # Live Graph vs Exported Script
//!
//! Every pipeline here runs twice: live, node by node through a `Graph`, and
//! as the `Script` exported from that graph (after a trip through JSON). Both
//! runs must leave equal values in every output slot.
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test graph_export
//! ```

use frameql::export::{Script, Vars};
use frameql::frame::DataFrame;
use frameql::graph::{slot_name, Graph, Input};
use frameql::node::{
    ConnectNode, DbQueryNode, ForEachRowNode, FrameQueryNode, GetValueNode, ReadCsvNode, COMPLETED,
    LOOP_BODY,
};
use frameql::persist::PinValue;
use frameql::query::{EngineConfig, ParamSet};
use frameql::types::Value;
use tempfile::tempdir;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn text(s: &str) -> Input {
    Input::value(Value::from(s))
}

/// Runs `graph` live from `entry`, then exports and runs the script, and
/// checks both produced the same slots with equal values.
fn run_both(mut graph: Graph, entry: &str) -> Vars {
    graph.run_from(entry).expect("live run SHOULD succeed");

    let exported = graph.export(entry).expect("export SHOULD succeed");
    let json = exported.to_json().unwrap();
    let script = Script::from_json(&json).expect("exported script SHOULD parse");
    let vars = script
        .run(&EngineConfig::default())
        .expect("script run SHOULD succeed");

    assert_eq!(
        graph.values().keys().collect::<Vec<_>>(),
        vars.keys().collect::<Vec<_>>(),
        "both runs SHOULD write the same slots"
    );
    for (slot, live) in graph.values() {
        assert_eq!(&vars[slot], live, "slot {} SHOULD match", slot);
    }
    vars
}

fn frame(vars: &Vars, slot: &str) -> DataFrame {
    match &vars[slot] {
        PinValue::Frame(frame) => frame.clone(),
        other => panic!("Expected a frame in {}, got {:?}", slot, other),
    }
}

fn people() -> DataFrame {
    DataFrame::from_rows(
        vec!["id", "name"],
        vec![
            vec![Value::Int(1), Value::from("aaa")],
            vec![Value::Int(2), Value::from("bbb")],
        ],
    )
    .unwrap()
}

// ============================================================================
// DATABASE QUERY PIPELINES
// ============================================================================

mod db_query_tests {
    use super::*;

    #[test]
    fn create_insert_select_on_external_database() {
        let mut graph = Graph::new();
        graph.add(ConnectNode::new("Db", Input::default())).unwrap();
        graph
            .add(DbQueryNode::new(
                "Q",
                Input::link("Db", "out"),
                text("CREATE TABLE t (id INTEGER, name TEXT);\nINSERT INTO t VALUES (1, 'aaa');\nSELECT * FROM t"),
            ))
            .unwrap();
        graph.connect("Db", COMPLETED, "Q").unwrap();

        let vars = run_both(graph, "Db");

        let result = frame(&vars, "Q_result");
        assert_eq!(result.column_names(), vec!["id", "name"]);
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.row_values(0), Some(vec![Value::Int(1), Value::from("aaa")]));
    }

    #[test]
    fn get_value_reads_first_row() {
        let mut graph = Graph::new();
        graph.add(ConnectNode::new("Db", Input::default())).unwrap();
        graph
            .add(DbQueryNode::new(
                "Q",
                Input::link("Db", "out"),
                text("CREATE TABLE t (id INTEGER, name TEXT);\nINSERT INTO t VALUES (1, 'aaa');\nSELECT * FROM t"),
            ))
            .unwrap();
        graph
            .add(GetValueNode::new("Get", Input::link("Q", "result"), text("name")))
            .unwrap();
        graph.connect("Db", COMPLETED, "Q").unwrap();
        graph.connect("Q", COMPLETED, "Get").unwrap();

        let vars = run_both(graph, "Db");

        assert_eq!(vars["Get_out"], PinValue::scalar("aaa"));
    }
}

// ============================================================================
// FRAME QUERY PIPELINES
// ============================================================================

mod frame_query_tests {
    use super::*;

    #[test]
    fn csv_into_frame_query_with_params() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "id,name\n1,aaa\n2,bbb\n3,ccc\n").unwrap();

        let mut query = FrameQueryNode::new("Q", text("SELECT name FROM people WHERE id >= :min ORDER BY id"));
        query.add_table("people", Input::link("Csv", "out")).unwrap();
        query.add_param("min", Input::value(Value::Int(2))).unwrap();
        query.set_bulk_params([("min", 99)].into_iter().collect());

        let mut graph = Graph::new();
        graph
            .add(ReadCsvNode::new("Csv", text(&path.to_string_lossy())))
            .unwrap();
        graph.add(query).unwrap();
        graph.connect("Csv", COMPLETED, "Q").unwrap();

        let vars = run_both(graph, "Csv");

        let result = frame(&vars, "Q_result");
        assert_eq!(result.column("name").unwrap().values(), &[Value::from("bbb"), Value::from("ccc")]);
    }

    #[test]
    fn several_statements_give_a_list() {
        let mut query = FrameQueryNode::new("Q", text("SELECT count(*) AS n FROM t;\nSELECT max(id) AS m FROM t"));
        query.add_table("t", Input::value(people())).unwrap();

        let mut graph = Graph::new();
        graph.add(query).unwrap();

        let vars = run_both(graph, "Q");

        let PinValue::Frames(frames) = &vars["Q_result"] else {
            panic!("Expected a list of frames");
        };
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].cell(0, "m"), Some(&Value::Int(2)));
    }

    #[test]
    fn bulk_params_export_as_literals() {
        let mut query = FrameQueryNode::new("Q", text("SELECT :a AS a, :b AS b"));
        let bulk: ParamSet = [("a", Value::from("x")), ("b", Value::Float(0.5))].into_iter().collect();
        query.set_bulk_params(bulk);

        let mut graph = Graph::new();
        graph.add(query).unwrap();

        let vars = run_both(graph, "Q");

        let result = frame(&vars, "Q_result");
        assert_eq!(result.row_values(0), Some(vec![Value::from("x"), Value::Float(0.5)]));
    }
}

// ============================================================================
// ROW ITERATION PIPELINES
// ============================================================================

mod for_each_row_tests {
    use super::*;

    /// Connect -> Setup -> Loop over people
    ///                       ├─ body: Get(name) -> Insert(:idx, :name)
    ///                       └─ completed: Done (log one completion)
    ///                                       -> Final (select the inserted rows)
    ///                                       -> Tally (count completions)
    fn looping_graph(rows: DataFrame) -> Graph {
        let mut graph = Graph::new();
        graph.add(ConnectNode::new("Db", text("sqlite://"))).unwrap();
        graph
            .add(
                DbQueryNode::new("Setup", Input::link("Db", "out"), text("CREATE TABLE seen (idx INTEGER, name TEXT);\nCREATE TABLE done (n INTEGER)"))
                    .with_has_result(Input::value(Value::Bool(false))),
            )
            .unwrap();
        graph
            .add(ForEachRowNode::new("Loop", Input::value(rows)))
            .unwrap();
        graph
            .add(GetValueNode::new("Get", Input::link("Loop", "row"), text("name")))
            .unwrap();

        let mut insert = DbQueryNode::new(
            "Insert",
            Input::link("Db", "out"),
            text("INSERT INTO seen VALUES (:idx, :name)"),
        )
        .with_has_result(Input::value(Value::Bool(false)));
        insert.add_param("idx", Input::link("Loop", "idx")).unwrap();
        insert.add_param("name", Input::link("Get", "out")).unwrap();
        graph.add(insert).unwrap();

        graph
            .add(
                DbQueryNode::new("Done", Input::link("Db", "out"), text("INSERT INTO done VALUES (1)"))
                    .with_has_result(Input::value(Value::Bool(false))),
            )
            .unwrap();
        graph
            .add(DbQueryNode::new(
                "Final",
                Input::link("Db", "out"),
                text("SELECT idx, name FROM seen ORDER BY idx"),
            ))
            .unwrap();
        graph
            .add(DbQueryNode::new(
                "Tally",
                Input::link("Db", "out"),
                text("SELECT count(*) AS n FROM done"),
            ))
            .unwrap();

        graph.connect("Db", COMPLETED, "Setup").unwrap();
        graph.connect("Setup", COMPLETED, "Loop").unwrap();
        graph.connect("Loop", LOOP_BODY, "Get").unwrap();
        graph.connect("Get", COMPLETED, "Insert").unwrap();
        graph.connect("Loop", COMPLETED, "Done").unwrap();
        graph.connect("Done", COMPLETED, "Final").unwrap();
        graph.connect("Final", COMPLETED, "Tally").unwrap();
        graph
    }

    fn completions(vars: &Vars) -> Option<Value> {
        frame(vars, "Tally_result").cell(0, "n").cloned()
    }

    #[test]
    fn body_runs_per_row_and_completion_once() {
        let vars = run_both(looping_graph(people()), "Db");

        let result = frame(&vars, "Final_result");
        assert_eq!(result.row_values(0), Some(vec![Value::Int(0), Value::from("aaa")]));
        assert_eq!(result.row_values(1), Some(vec![Value::Int(1), Value::from("bbb")]));
        assert_eq!(result.row_count(), 2);
        assert_eq!(completions(&vars), Some(Value::Int(1)));
    }

    #[test]
    fn empty_frame_skips_body_but_completes() {
        let vars = run_both(looping_graph(DataFrame::empty(vec!["id", "name"])), "Db");

        assert!(!vars.contains_key(&slot_name("Get", "out")));
        assert_eq!(frame(&vars, "Final_result").row_count(), 0);
        assert_eq!(completions(&vars), Some(Value::Int(1)));
    }

    #[test]
    fn loop_body_is_nested_in_the_script() {
        let graph = looping_graph(people());

        let script = graph.export("Db").unwrap();

        let ops: Vec<&str> = script.steps.iter().map(|s| s.op()).collect();
        assert_eq!(
            ops,
            vec!["connect", "query_database", "for_each_row", "query_database", "query_database", "query_database"]
        );
    }
}

// ============================================================================
// FAILURE PROPAGATION
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn error_stops_both_paths_at_the_same_node() {
        let mut graph = Graph::new();
        graph.add(ConnectNode::new("Db", Input::default())).unwrap();
        graph
            .add(DbQueryNode::new("Bad", Input::link("Db", "out"), text("SELECT * FROM missing")))
            .unwrap();
        graph
            .add(GetValueNode::new("After", Input::link("Bad", "result"), text("x")))
            .unwrap();
        graph.connect("Db", COMPLETED, "Bad").unwrap();
        graph.connect("Bad", COMPLETED, "After").unwrap();

        assert!(graph.run_from("Db").is_err());
        assert!(graph.value(&slot_name("After", "out")).is_none());

        let script = graph.export("Db").unwrap();
        assert!(script.run(&EngineConfig::default()).is_err());
    }
}
