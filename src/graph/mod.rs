//! # Execution Graph
//!
//! A minimal host for nodes: enough to run a pipeline the way a visual
//! scripting host would, and to export the same pipeline as a [`Script`].
//!
//! ## Model
//!
//! ```text
//! Graph
//! ├── nodes      name -> Box<dyn Node>
//! ├── exec links (node, exec pin) -> [node, ...]
//! └── values     "<node>_<pin>" -> PinValue      output slots
//! ```
//!
//! Data flows through output slots: a node input is an [`Input`], either a
//! constant or a link to an upstream output slot. Control flows through exec
//! links: when a node fires one of its exec pins, every node linked to that
//! pin computes, synchronously and in link order, before `fire` returns.
//!
//! ## Running
//!
//! ```text
//! run_from("Connect")
//!   └── Connect.compute ── set_output("out") ── fire("completed")
//!         └── Query.compute ── set_output("result") ── fire("completed")
//!               └── ...
//! ```
//!
//! An error from any node aborts the chain: nothing downstream of the
//! failing node fires and the error is returned from `run_from`.
//!
//! ## Exporting
//!
//! `export(entry)` walks the same exec links without running anything. Each
//! node appends the steps that reproduce its `compute`; each node is
//! exported once even if several links reach it.
//!
//! [`Script`]: crate::export::Script

use std::collections::BTreeMap;

use eyre::{bail, eyre, Result};
use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::export::{Operand, Script, Step};
use crate::persist::{encode, PinValue};

/// Name of the slot holding output `pin` of node `node`.
pub fn slot_name(node: &str, pin: &str) -> String {
    format!("{}_{}", node, pin)
}

/// Where a node input takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Value(PinValue),
    Link(String),
}

impl Input {
    pub fn value(value: impl Into<PinValue>) -> Self {
        Input::Value(value.into())
    }

    /// A link to output `pin` of `node`.
    pub fn link(node: &str, pin: &str) -> Self {
        Input::Link(slot_name(node, pin))
    }
}

impl Default for Input {
    fn default() -> Self {
        Input::Value(PinValue::Null)
    }
}

pub trait Node {
    fn name(&self) -> &str;

    fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()>;

    fn export(&self, exporter: &mut Exporter<'_>) -> Result<()>;
}

#[derive(Default)]
pub struct Graph {
    nodes: Vec<Option<Box<dyn Node>>>,
    index: HashMap<String, usize>,
    links: HashMap<(String, String), Vec<String>>,
    values: BTreeMap<String, PinValue>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<N: Node + 'static>(&mut self, node: N) -> Result<()> {
        let name = node.name().to_string();
        if self.index.contains_key(&name) {
            bail!("graph already has a node named '{}'", name);
        }
        self.index.insert(name, self.nodes.len());
        self.nodes.push(Some(Box::new(node)));
        Ok(())
    }

    /// Links exec output `pin` of `from` to node `to`.
    pub fn connect(&mut self, from: &str, pin: &str, to: &str) -> Result<()> {
        for name in [from, to] {
            if !self.index.contains_key(name) {
                bail!("graph has no node named '{}'", name);
            }
        }
        self.links
            .entry((from.to_string(), pin.to_string()))
            .or_default()
            .push(to.to_string());
        Ok(())
    }

    pub fn run_from(&mut self, node: &str) -> Result<()> {
        self.compute_node(node)
    }

    pub fn value(&self, slot: &str) -> Option<&PinValue> {
        self.values.get(slot)
    }

    /// Every output slot written so far.
    pub fn values(&self) -> &BTreeMap<String, PinValue> {
        &self.values
    }

    pub fn export(&self, entry: &str) -> Result<Script> {
        let mut exporter = Exporter {
            graph: self,
            processed: HashSet::new(),
            steps: Vec::new(),
            node: String::new(),
        };
        exporter.export_node(entry)?;
        Ok(Script::new(exporter.steps))
    }

    fn targets(&self, node: &str, pin: &str) -> Vec<String> {
        self.links
            .get(&(node.to_string(), pin.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn compute_node(&mut self, name: &str) -> Result<()> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| eyre!("graph has no node named '{}'", name))?;
        let mut node = self.nodes[idx]
            .take()
            .ok_or_else(|| eyre!("node '{}' fired while it is running", name))?;

        debug!(node = name, "compute");
        let result = {
            let mut exec = Executor {
                graph: self,
                node: name.to_string(),
            };
            node.compute(&mut exec)
        };

        self.nodes[idx] = Some(node);
        result
    }
}

/// A node's view of the graph while it computes.
pub struct Executor<'g> {
    graph: &'g mut Graph,
    node: String,
}

impl Executor<'_> {
    /// Current value of an input. A link to a slot nothing has written yet
    /// reads as null.
    pub fn input(&self, input: &Input) -> PinValue {
        match input {
            Input::Value(value) => value.clone(),
            Input::Link(slot) => self.graph.values.get(slot).cloned().unwrap_or_default(),
        }
    }

    pub fn set_output(&mut self, pin: &str, value: PinValue) {
        self.graph.values.insert(slot_name(&self.node, pin), value);
    }

    /// Computes every node linked to exec output `pin`, in link order.
    pub fn fire(&mut self, pin: &str) -> Result<()> {
        for target in self.graph.targets(&self.node, pin) {
            self.graph.compute_node(&target)?;
        }
        Ok(())
    }
}

/// A node's view of the graph while it exports.
pub struct Exporter<'g> {
    graph: &'g Graph,
    processed: HashSet<String>,
    steps: Vec<Step>,
    node: String,
}

impl Exporter<'_> {
    /// How a step reads an input: a variable for links, a literal for
    /// constants.
    pub fn operand(&self, input: &Input) -> Operand {
        match input {
            Input::Value(value) => Operand::Literal(encode(value)),
            Input::Link(slot) => Operand::Var(slot.clone()),
        }
    }

    /// Variable name of this node's output `pin`.
    pub fn output(&self, pin: &str) -> String {
        slot_name(&self.node, pin)
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Exports the nodes linked to exec output `pin` after the current steps.
    pub fn follow(&mut self, pin: &str) -> Result<()> {
        for target in self.graph.targets(&self.node, pin) {
            self.export_node(&target)?;
        }
        Ok(())
    }

    /// Exports the nodes linked to exec output `pin` into a separate block,
    /// such as a loop body.
    pub fn block(&mut self, pin: &str) -> Result<Vec<Step>> {
        let outer = std::mem::take(&mut self.steps);
        let result = self.follow(pin);
        let inner = std::mem::replace(&mut self.steps, outer);
        result.map(|()| inner)
    }

    fn export_node(&mut self, name: &str) -> Result<()> {
        if !self.processed.insert(name.to_string()) {
            return Ok(());
        }
        let graph = self.graph;
        let idx = *graph
            .index
            .get(name)
            .ok_or_else(|| eyre!("graph has no node named '{}'", name))?;
        let node = graph.nodes[idx]
            .as_deref()
            .ok_or_else(|| eyre!("node '{}' is unavailable", name))?;

        let outer = std::mem::replace(&mut self.node, name.to_string());
        let result = node.export(self);
        self.node = outer;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    /// Counts its computes into slot `<name>_count` and fires `next`.
    struct Counter {
        name: String,
        fail: bool,
    }

    impl Counter {
        fn new(name: &str) -> Self {
            Self {
                name: name.into(),
                fail: false,
            }
        }
    }

    impl Node for Counter {
        fn name(&self) -> &str {
            &self.name
        }

        fn compute(&mut self, exec: &mut Executor<'_>) -> Result<()> {
            if self.fail {
                bail!("{} failed", self.name);
            }
            let count = exec
                .input(&Input::link(&self.name, "count"))
                .as_scalar()
                .and_then(|v| v.as_int())
                .unwrap_or(0);
            exec.set_output("count", PinValue::scalar(count + 1));
            exec.fire("next")
        }

        fn export(&self, exporter: &mut Exporter<'_>) -> Result<()> {
            exporter.push(Step::Connect {
                out: exporter.output("out"),
                url: Operand::Literal(serde_json::json!("sqlite://")),
            });
            exporter.follow("next")
        }
    }

    fn count(graph: &Graph, node: &str) -> Option<Value> {
        graph
            .value(&slot_name(node, "count"))
            .and_then(PinValue::as_scalar)
    }

    #[test]
    fn fire_runs_linked_nodes_in_order() {
        let mut graph = Graph::new();
        graph.add(Counter::new("a")).unwrap();
        graph.add(Counter::new("b")).unwrap();
        graph.add(Counter::new("c")).unwrap();
        graph.connect("a", "next", "b").unwrap();
        graph.connect("a", "next", "c").unwrap();

        graph.run_from("a").unwrap();

        assert_eq!(count(&graph, "b"), Some(Value::Int(1)));
        assert_eq!(count(&graph, "c"), Some(Value::Int(1)));
    }

    #[test]
    fn error_stops_downstream() {
        let mut graph = Graph::new();
        graph.add(Counter::new("a")).unwrap();
        graph
            .add(Counter {
                name: "b".into(),
                fail: true,
            })
            .unwrap();
        graph.add(Counter::new("c")).unwrap();
        graph.connect("a", "next", "b").unwrap();
        graph.connect("b", "next", "c").unwrap();

        let err = graph.run_from("a").unwrap_err();

        assert!(err.to_string().contains("b failed"));
        assert_eq!(count(&graph, "c"), None);
    }

    #[test]
    fn cycle_is_an_error() {
        let mut graph = Graph::new();
        graph.add(Counter::new("a")).unwrap();
        graph.connect("a", "next", "a").unwrap();

        assert!(graph.run_from("a").is_err());
    }

    #[test]
    fn duplicate_and_unknown_names_are_rejected() {
        let mut graph = Graph::new();
        graph.add(Counter::new("a")).unwrap();

        assert!(graph.add(Counter::new("a")).is_err());
        assert!(graph.connect("a", "next", "zzz").is_err());
        assert!(graph.run_from("zzz").is_err());
    }

    #[test]
    fn unwritten_link_reads_null() {
        let mut graph = Graph::new();
        let exec = Executor {
            graph: &mut graph,
            node: "x".into(),
        };
        assert_eq!(exec.input(&Input::link("nowhere", "out")), PinValue::Null);
    }

    #[test]
    fn export_visits_each_node_once() {
        let mut graph = Graph::new();
        for name in ["a", "b", "c"] {
            graph.add(Counter::new(name)).unwrap();
        }
        graph.connect("a", "next", "b").unwrap();
        graph.connect("a", "next", "c").unwrap();
        graph.connect("b", "next", "c").unwrap();

        let script = graph.export("a").unwrap();

        assert_eq!(script.steps.len(), 3);
    }
}
