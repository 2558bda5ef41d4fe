use crate::types::Value;
use eyre::{bail, Result};

/// One row of a frame, labelled with the row's index value.
///
/// `index` holds the column names the values belong to, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub name: Value,
    pub index: Vec<String>,
    pub values: Vec<Value>,
}

impl Series {
    pub fn new(name: Value, index: Vec<String>, values: Vec<Value>) -> Self {
        Self { name, index, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value under the first label equal to `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index
            .iter()
            .position(|label| label == key)
            .and_then(|i| self.values.get(i))
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.get(key) {
            Some(Value::Int(i)) => Ok(*i),
            Some(other) => bail!("expected INT for '{}', got {:?}", key, other),
            None => bail!("no value labelled '{}'", key),
        }
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.get(key) {
            Some(Value::Float(f)) => Ok(*f),
            Some(other) => bail!("expected FLOAT for '{}', got {:?}", key, other),
            None => bail!("no value labelled '{}'", key),
        }
    }

    pub fn get_text(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(Value::Text(s)) => Ok(s),
            Some(other) => bail!("expected TEXT for '{}', got {:?}", key, other),
            None => bail!("no value labelled '{}'", key),
        }
    }

    pub fn is_null(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Null))
    }
}
