//! Fuzz target for script splitting, table name extraction and column name
//! deduplication.
//!
//! None of them may panic on arbitrary text, and `uniquify` must always
//! return as many names as it was given, all distinct.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use frameql::frame::uniquify;
use frameql::query::{extract_table_names, split_statements};

#[derive(Debug, Arbitrary)]
struct ScriptInput {
    script: String,
    columns: Vec<String>,
}

fuzz_target!(|input: ScriptInput| {
    for statement in split_statements(&input.script) {
        assert!(!statement.is_empty());
        assert_eq!(statement, statement.trim());
    }

    let names = extract_table_names(&input.script);
    let mut sorted = names.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), names.len());

    let unique = uniquify(&input.columns);
    assert_eq!(unique.len(), input.columns.len());
    let mut seen = std::collections::HashSet::new();
    for name in &unique {
        assert!(seen.insert(name.as_str()), "duplicate name {:?}", name);
    }
});
